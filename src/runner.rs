// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Host [`Runner`] executing `.feature` files against an [`Engine`].
//!
//! A run goes through the following phases:
//! 1. `.feature` files are parsed into [`Scenario`]s;
//! 2. [`Scenario`]s are filtered by the [`cli::Opts`];
//! 3. the [`Engine`] collects the selected ones, aborting the whole run on
//!    any problem found;
//! 4. every collected scenario is set up and run independently.

use std::{borrow::Cow, fmt, io, path::Path};

use console::{Style, Term};
use derive_more::with_trait::{Display, Error as StdError, From};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    cli,
    engine::Engine,
    error::{CollectionError, ScenarioError},
    feature,
    fixture::{FixtureProvider, Fixtures},
    scenario::Scenario,
    tag::Ext as _,
};

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering passed scenarios.
    pub ok: Style,

    /// [`Style`] for rendering errors and failed scenarios.
    pub err: Style,

    /// [`Style`] for rendering headers.
    pub header: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the terminal was detected.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            err: Style::new().red(),
            header: Style::new().blue(),
            bold: Style::new().bold(),
            is_present: console::user_attended() && console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the `style` to the `input` if the terminal is present.
    fn apply<'a>(
        &self,
        style: &Style,
        input: impl Into<Cow<'a, str>>,
    ) -> Cow<'a, str> {
        let input = input.into();
        if self.is_present {
            style.apply_to(input).to_string().into()
        } else {
            input
        }
    }

    /// If terminal is present colors `input` with [`Styles::ok`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.ok, input)
    }

    /// If terminal is present colors `input` with [`Styles::err`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.err, input)
    }

    /// If terminal is present colors `input` with [`Styles::header`] color
    /// or leaves "as is" otherwise.
    #[must_use]
    pub fn header<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.header, input)
    }

    /// If terminal is present makes `input` __bold__ or leaves "as is"
    /// otherwise.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.bold, input)
    }
}

/// Error aborting a whole [`Runner`] run.
#[derive(Clone, Debug, Display, From, StdError)]
pub enum Error {
    /// Loading of `.feature` files failed.
    #[display("{_0}")]
    Load(feature::Error),

    /// Collection of the selected scenarios failed.
    #[display("{_0}")]
    Collection(CollectionError),
}

/// Outcome of the scenarios executed by a [`Runner`].
#[derive(Clone, Debug, Default)]
pub struct Summary {
    /// Names of the passed scenarios.
    pub passed: Vec<String>,

    /// Failures of the failed scenarios.
    pub failed: Vec<ScenarioError>,
}

impl Summary {
    /// Returns the number of executed scenarios.
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Indicates whether no scenario failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.total() == 1 { "" } else { "s" };
        write!(
            f,
            "{} scenario{plural} ({} passed, {} failed)",
            self.total(),
            self.passed.len(),
            self.failed.len(),
        )
    }
}

/// Installs a global [`tracing`] subscriber sized by the `verbose` counter.
///
/// Does nothing if a global subscriber is installed already.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init()
        .is_err()
    {
        tracing::trace!("global subscriber is already installed");
    }
}

/// Host runner executing `.feature` files against an [`Engine`], resolving
/// fixtures with `P`.
///
/// # Example
///
/// ```rust,no_run
/// use cucumber_engine::{cli, Engine, Runner, Step};
///
/// let mut engine = Engine::new();
/// engine
///     .register_step(Step::new("I do nothing", |_| Ok(())))
///     .unwrap();
///
/// Runner::new(engine)
///     .with_cli(cli::Opts::parsed())
///     .run_and_exit("tests/features");
/// ```
#[derive(Debug)]
pub struct Runner<P = Fixtures> {
    /// [`Engine`] collecting and executing scenarios.
    engine: Engine,

    /// Provider of the fixtures required by scenarios.
    fixtures: P,

    /// CLI options.
    opts: cli::Opts,
}

impl Runner {
    /// Creates a new [`Runner`] over the `engine`, providing the default
    /// [`Fixtures`].
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            fixtures: Fixtures::default(),
            opts: cli::Opts::default(),
        }
    }
}

impl<P: FixtureProvider> Runner<P> {
    /// Replaces the [`FixtureProvider`] of this [`Runner`].
    #[must_use]
    pub fn with_fixtures<Q: FixtureProvider>(self, fixtures: Q) -> Runner<Q> {
        Runner { engine: self.engine, fixtures, opts: self.opts }
    }

    /// Sets the [`cli::Opts`] of this [`Runner`].
    ///
    /// Proposal options override the [`Engine`]'s configuration only when
    /// given explicitly.
    #[must_use]
    pub fn with_cli(mut self, opts: cli::Opts) -> Self {
        self.opts = opts;
        self
    }

    /// Returns the [`Engine`] of this [`Runner`].
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Indicates whether the `scenario` is selected by the CLI filters.
    fn is_selected(&self, scenario: &Scenario) -> bool {
        if let Some(re) = &self.opts.re_filter {
            return re.is_match(&scenario.name);
        }
        self.opts
            .tags_filter
            .as_ref()
            .map_or(true, |op| op.eval(scenario.tags.iter()))
    }

    /// Runs the scenarios of the `.feature` file (or directory) at `path`.
    ///
    /// # Errors
    ///
    /// If loading or collecting the scenarios failed. Failed scenarios are
    /// reported in the [`Summary`] instead.
    pub fn run(self, path: impl AsRef<Path>) -> Result<Summary, Error> {
        self.filter_run(path, |_| true)
    }

    /// Runs the scenarios of the `.feature` file (or directory) at `path`,
    /// additionally selected by the `filter`.
    ///
    /// # Errors
    ///
    /// If loading or collecting the scenarios failed.
    pub fn filter_run<F>(
        self,
        path: impl AsRef<Path>,
        filter: F,
    ) -> Result<Summary, Error>
    where
        F: Fn(&Scenario) -> bool,
    {
        self.opts.color.apply();
        init_tracing(self.opts.verbose);
        let styles = Styles::new();
        let term = Term::stdout();

        let scenarios = feature::load(path)?
            .into_iter()
            .filter(|sc| self.is_selected(sc) && filter(sc))
            .collect::<Vec<_>>();
        tracing::debug!(selected = scenarios.len(), "scenarios selected");

        let Self { mut engine, fixtures, opts } = self;
        if opts.no_proposal || opts.proposal_dir.is_some() {
            engine = engine.with_proposal_dir(opts.proposal_dir());
        }

        let runs = engine.collect(scenarios).inspect_err(|e| {
            _ = term.write_line(&styles.err(e.to_string()));
        })?;

        let mut summary = Summary::default();
        for mut run in runs {
            match engine.execute(&mut run, &fixtures) {
                Ok(()) => {
                    let line = format!("✔  {}", run.name());
                    _ = term.write_line(&styles.ok(line));
                    summary.passed.push(run.name().to_owned());
                }
                Err(e) => {
                    let line = format!("✘  {}\n   {e}", run.name());
                    _ = term.write_line(&styles.err(line));
                    summary.failed.push(e);
                }
            }
        }

        let line = summary.to_string();
        let line = if summary.is_success() {
            styles.ok(line)
        } else {
            styles.err(line)
        };
        _ = term.write_line(&format!(
            "{}\n{}",
            styles.header("[Summary]"),
            styles.bold(line),
        ));

        Ok(summary)
    }

    /// Runs the scenarios of the `.feature` file (or directory) at `path`.
    ///
    /// # Panics
    ///
    /// If loading or collecting the scenarios failed, or at least one
    /// scenario failed.
    pub fn run_and_exit(self, path: impl AsRef<Path>) {
        match self.run(path) {
            Ok(summary) if summary.is_success() => {}
            Ok(summary) => {
                panic!("{} scenario(s) failed", summary.failed.len())
            }
            Err(e) => panic!("{e}"),
        }
    }
}
