// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Engine`] owning the step registry and the collection diagnostics of one
//! suite run.

use std::{fmt, path::PathBuf, sync::Arc};

use smart_default::SmartDefault;

use crate::{
    diagnostics::{CollectionReport, Diagnostics},
    error::{CollectionError, PatternError, ScenarioError},
    fixture::{FixtureProvider, Resolved},
    hooks::Hooks,
    proposal,
    scenario::{Scenario, ScenarioRun},
    step::{Collection, Step, StepDefinition},
};

/// Configuration of an [`Engine`].
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Directory where the proposal for missing steps is written.
    ///
    /// [`None`] disables writing it.
    #[default(Some(PathBuf::from(".")))]
    pub proposal_dir: Option<PathBuf>,
}

/// Handler claiming scenario tags.
///
/// Returns `true` if the tag was claimed, otherwise the tag is attached to
/// the scenario as a marker.
pub type TagHandler = Arc<dyn Fn(&str, &mut ScenarioRun) -> bool + Send + Sync>;

/// Step registry and collection diagnostics of one suite run.
///
/// Nothing is shared between [`Engine`]s, so independent suites don't leak
/// state into each other.
///
/// # Example
///
/// ```rust
/// use cucumber_engine::{Engine, Fixtures, Scenario, Step, Value};
///
/// let mut engine = Engine::new().without_proposal();
/// engine
///     .register_step(
///         Step::new("I have {n:d} cucumbers", |call| {
///             let n = call.int("n")?;
///             call.context()?.insert("n".into(), Value::Int(n));
///             Ok(())
///         })
///         .param("n")
///         .fixture("context"),
///     )
///     .unwrap();
///
/// let mut runs = engine
///     .collect([Scenario::new("Counting").step("I have 5 cucumbers")])
///     .unwrap();
/// engine.execute(&mut runs[0], &Fixtures::default()).unwrap();
/// ```
#[derive(Clone, Default)]
pub struct Engine {
    /// Configuration.
    config: Config,

    /// Registered steps.
    steps: Collection,

    /// Collected problems.
    diagnostics: Diagnostics,

    /// Lifecycle hooks.
    hooks: Hooks,

    /// Tag claiming extension point.
    tag_handler: Option<TagHandler>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("steps", &self.steps)
            .field("diagnostics", &self.diagnostics)
            .field("hooks", &self.hooks)
            .field("tag_handler", &self.tag_handler.is_some())
            .finish()
    }
}

impl Engine {
    /// Creates a new empty [`Engine`] with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty [`Engine`] with the given [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// Sets the directory to write the proposal for missing steps into.
    ///
    /// [`None`] disables writing it.
    #[must_use]
    pub fn with_proposal_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.proposal_dir = dir;
        self
    }

    /// Disables writing the proposal for missing steps.
    #[must_use]
    pub fn without_proposal(self) -> Self {
        self.with_proposal_dir(None)
    }

    /// Returns the [`Config`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Sets the tag handler, replacing any previous one.
    #[must_use]
    pub fn with_tag_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &mut ScenarioRun) -> bool + Send + Sync + 'static,
    {
        self.tag_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the lifecycle [`Hooks`], replacing the previous ones.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the lifecycle [`Hooks`].
    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Registers a [`Step`].
    ///
    /// Overlaps with already registered steps don't fail the registration,
    /// but are collected into the [`Diagnostics`].
    ///
    /// Registration order matters: a step text is bound to the first
    /// registered step matching it.
    ///
    /// # Errors
    ///
    /// If the step template is malformed.
    pub fn register_step(&mut self, step: Step) -> Result<(), PatternError> {
        let definition = step.compile()?;
        tracing::debug!(
            template = definition.pattern().template(),
            location = ?definition.location(),
            "registering step",
        );
        for ambiguity in self.steps.add(definition) {
            self.diagnostics.add_error(ambiguity);
        }
        Ok(())
    }

    /// Returns the first registered [`StepDefinition`] matching the `text`.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&Arc<StepDefinition>> {
        self.steps.find(text)
    }

    /// Returns the registered steps.
    #[must_use]
    pub const fn steps(&self) -> &Collection {
        &self.steps
    }

    /// Returns the problems collected so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Renders the problems collected so far.
    #[must_use]
    pub fn report(&self) -> CollectionReport {
        self.diagnostics.report()
    }

    /// Creates a [`ScenarioRun`] of the `scenario`, applying its tags.
    ///
    /// Every tag (stripped of its `@`) is offered to the tag handler first;
    /// unclaimed ones become markers.
    #[must_use]
    pub fn prepare(&self, scenario: Scenario) -> ScenarioRun {
        let tags = scenario.tags.clone();
        let mut run = ScenarioRun::new(scenario);
        for tag in &tags {
            let tag = tag.trim_start_matches('@');
            let claimed =
                self.tag_handler.as_ref().is_some_and(|h| h(tag, &mut run));
            if !claimed {
                run.add_marker(tag);
            }
        }
        run
    }

    /// Verifies the `run` against the registered steps, collecting problems.
    ///
    /// # Errors
    ///
    /// See [`ScenarioRun::verify()`].
    pub fn verify(
        &mut self,
        run: &mut ScenarioRun,
    ) -> Result<(), ScenarioError> {
        run.verify(&self.steps, &mut self.diagnostics)
    }

    /// Collects the `scenarios`: prepares and verifies every one of them.
    ///
    /// Collection is all or nothing: if any problem was found (including
    /// ambiguous registrations), no [`ScenarioRun`] is returned and the
    /// proposal for the missing steps is written (unless disabled).
    ///
    /// # Errors
    ///
    /// [`CollectionError`] listing every problem found.
    pub fn collect(
        &mut self,
        scenarios: impl IntoIterator<Item = Scenario>,
    ) -> Result<Vec<ScenarioRun>, CollectionError> {
        let mut runs = Vec::new();
        for scenario in scenarios {
            let mut run = self.prepare(scenario);
            // Problems end up in the diagnostics.
            _ = self.verify(&mut run);
            runs.push(run);
        }

        if self.diagnostics.is_empty() {
            tracing::debug!(scenarios = runs.len(), "collection succeeded");
            return Ok(runs);
        }

        let report = self.diagnostics.report();
        let proposal = match &self.config.proposal_dir {
            Some(dir) if !report.missing_steps.is_empty() => {
                proposal::generate(dir, &report.missing_steps)
                    .inspect_err(|e| {
                        tracing::error!(
                            dir = %dir.display(),
                            "failed to write proposal for missing steps: {e}",
                        );
                    })
                    .ok()
            }
            _ => None,
        };
        tracing::error!(
            errors = report.errors.len(),
            missing = report.missing_steps.len(),
            "collection failed",
        );
        Err(CollectionError { report, proposal })
    }

    /// Resolves the fixtures required by the `run`.
    ///
    /// # Errors
    ///
    /// See [`ScenarioRun::setup()`].
    pub fn setup(
        &self,
        run: &mut ScenarioRun,
        provider: &dyn FixtureProvider,
    ) -> Result<Resolved, ScenarioError> {
        run.setup(provider)
    }

    /// Runs the `run` with the `resolved` fixtures and the engine's
    /// [`Hooks`].
    ///
    /// # Errors
    ///
    /// See [`ScenarioRun::run()`].
    pub fn run(
        &self,
        run: &mut ScenarioRun,
        resolved: &Resolved,
    ) -> Result<(), ScenarioError> {
        run.run(resolved, &self.hooks)
    }

    /// Sets up and runs a verified `run`, dropping its fixtures at the end.
    ///
    /// # Errors
    ///
    /// See [`Engine::setup()`] and [`Engine::run()`].
    pub fn execute(
        &self,
        run: &mut ScenarioRun,
        provider: &dyn FixtureProvider,
    ) -> Result<(), ScenarioError> {
        let resolved = self.setup(run, provider)?;
        self.run(run, &resolved)
    }

    /// Drops every collected problem, keeping the registered steps.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }
}
