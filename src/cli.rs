// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options of the [`Runner`], filtering scenarios based on [`Regex`] or
//! [tag expressions][1].
//!
//! [`Runner`]: crate::Runner
//! [1]: https://cucumber.io/docs/cucumber/api#tag-expressions

use std::{path::PathBuf, str::FromStr};

use gherkin::tagexpr::TagOperation;
use regex::Regex;
use smart_default::SmartDefault;

pub use clap::Parser;

/// Root CLI (command line interface) of a [`Runner`].
///
/// # Example
///
/// ```rust
/// use cucumber_engine::cli::{Opts, Parser as _};
///
/// let opts =
///     Opts::try_parse_from(["calc", "--tags", "@fast", "-vv"]).unwrap();
/// assert!(opts.tags_filter.is_some());
/// assert_eq!(opts.verbose, 2);
/// ```
///
/// [`Runner`]: crate::Runner
#[derive(clap::Parser, Clone, Debug, SmartDefault)]
#[command(
    name = "cucumber-engine",
    about = "Run the scenarios of `.feature` files against registered steps"
)]
pub struct Opts {
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name"
    )]
    pub re_filter: Option<Regex>,

    /// Tag expression to filter scenarios by.
    ///
    /// Note: Tags from Feature, Rule and Scenario are merged together on
    /// filtering, so be careful about conflicting tags on different levels.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        conflicts_with = "name"
    )]
    pub tags_filter: Option<TagOperation>,

    /// Directory to write the proposal for missing steps into.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "dir", conflicts_with = "no_proposal")]
    pub proposal_dir: Option<PathBuf>,

    /// Don't write the proposal for missing steps.
    #[arg(long)]
    pub no_proposal: bool,

    /// Verbosity of logging.
    ///
    /// `-v` enables debug logs of the engine, `-vv` trace ones.
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Coloring policy for a console output.
    #[arg(long, value_name = "auto|always|never", default_value = "auto")]
    #[default(Coloring::Auto)]
    pub color: Coloring,
}

impl Opts {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Returns the directory to write the proposal for missing steps into,
    /// if any.
    #[must_use]
    pub fn proposal_dir(&self) -> Option<PathBuf> {
        (!self.no_proposal).then(|| {
            self.proposal_dir.clone().unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] to decide, whether output should
    /// be colored.
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl Coloring {
    /// Applies this policy to [`console`] globally.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => console::set_colors_enabled(true),
            Self::Never => console::set_colors_enabled(false),
        }
    }
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Opts::try_parse_from(["t"]).unwrap();
        assert!(opts.re_filter.is_none());
        assert!(opts.tags_filter.is_none());
        assert_eq!(opts.verbose, 0);
        assert_eq!(opts.color, Coloring::Auto);
        assert_eq!(opts.proposal_dir(), Some(PathBuf::from(".")));
        assert_eq!(Opts::default().color, Coloring::Auto);
    }

    #[test]
    fn name_and_tags_conflict() {
        let both = ["t", "-n", "Adding", "-t", "@fast"];
        assert!(Opts::try_parse_from(both).is_err());
        let opts =
            Opts::try_parse_from(["t", "--scenario-name", "^Add"]).unwrap();
        assert!(opts.re_filter.unwrap().is_match("Adding"));
    }

    #[test]
    fn proposal_options() {
        let opts =
            Opts::try_parse_from(["t", "--proposal-dir", "out"]).unwrap();
        assert_eq!(opts.proposal_dir(), Some(PathBuf::from("out")));

        let opts = Opts::try_parse_from(["t", "--no-proposal"]).unwrap();
        assert_eq!(opts.proposal_dir(), None);

        assert!(
            Opts::try_parse_from(["t", "--no-proposal", "--proposal-dir", "x"])
                .is_err(),
        );
    }

    #[test]
    fn coloring() {
        let opts = Opts::try_parse_from(["t", "--color", "NEVER"]).unwrap();
        assert_eq!(opts.color, Coloring::Never);
        assert!(Opts::try_parse_from(["t", "--color", "rainbow"]).is_err());
    }
}
