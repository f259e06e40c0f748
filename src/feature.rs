// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading of [`Scenario`]s out of `.feature` files.
//!
//! Everything the engine expects to be pre-processed happens here:
//! - [Scenario Outline][1] [Examples][2] are expanded into concrete
//!   scenarios;
//! - [Background][3] steps (of the feature and of the rule) are prepended;
//! - feature, rule and scenario tags are merged.
//!
//! [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
//! [2]: https://cucumber.io/docs/gherkin/reference#examples
//! [3]: https://cucumber.io/docs/gherkin/reference#background

use std::{
    iter,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::with_trait::{Display, Error as StdError, From};
use lazy_regex::regex;

use crate::{
    argument::Argument,
    scenario::{Scenario, StepText},
};

/// Error of loading `.feature` files.
#[derive(Clone, Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to walk a directory.
    #[display("Failed to walk `.feature` files: {_0}")]
    Walk(Arc<globwalk::GlobError>),

    /// Failed to parse a [`gherkin::Feature`].
    #[display("Failed to parse feature: {_0}")]
    Parsing(Arc<gherkin::ParseFileError>),

    /// Failed to expand [`gherkin::Examples`].
    #[display("Failed to expand examples: {_0}")]
    ExampleExpansion(ExpandExamplesError),
}

/// Error of [Scenario Outline][1] expansion encountering an unknown
/// placeholder.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Display, StdError)]
#[display(
    "Failed to resolve <{name}> at {}:{}:{}",
    path.as_deref()
        .map(Path::display)
        .map(|p| p.to_string())
        .unwrap_or_default(),
    pos.line,
    pos.col,
)]
pub struct ExpandExamplesError {
    /// Position of the unknown placeholder.
    #[error(not(source))]
    pub pos: gherkin::LineCol,

    /// Name of the unknown placeholder.
    #[error(not(source))]
    pub name: String,

    /// [`Path`] to the `.feature` file, if present.
    #[error(not(source))]
    pub path: Option<PathBuf>,
}

/// Parses the `.feature` file at `path`, or every `.feature` file under it if
/// it's a directory, into [`Scenario`]s.
///
/// # Errors
///
/// If any file fails to parse or to expand.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Scenario>, Error> {
    let path = path.as_ref();
    let features = if path.is_file() {
        vec![parse_file(path)?]
    } else {
        let walker = globwalk::GlobWalkerBuilder::new(path, "*.feature")
            .case_insensitive(true)
            .build()
            .map_err(Arc::new)?;
        let mut paths = walker
            .filter_map(Result::ok)
            .map(|entry| entry.path().to_owned())
            .collect::<Vec<_>>();
        paths.sort();
        paths
            .iter()
            .map(|p| parse_file(p))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut scenarios = Vec::new();
    for feature in features {
        tracing::debug!(
            feature = %feature.name,
            path = ?feature.path,
            "loading feature",
        );
        scenarios.extend(to_scenarios(feature)?);
    }
    Ok(scenarios)
}

/// Parses a single `.feature` file.
fn parse_file(path: &Path) -> Result<gherkin::Feature, Error> {
    gherkin::Feature::parse_path(path, gherkin::GherkinEnv::default())
        .map_err(|e| Arc::new(e).into())
}

/// Converts a parsed [`gherkin::Feature`] into [`Scenario`]s.
///
/// # Errors
///
/// If any [Scenario Outline][1] references an unknown placeholder.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
pub fn to_scenarios(
    feature: gherkin::Feature,
) -> Result<Vec<Scenario>, ExpandExamplesError> {
    let background = feature
        .background
        .as_ref()
        .map(|b| b.steps.as_slice())
        .unwrap_or_default();

    let mut scenarios = Vec::new();
    let mut push = |outline: &gherkin::Scenario,
                    rule: Option<&gherkin::Rule>|
     -> Result<(), ExpandExamplesError> {
        let rule_background = rule
            .and_then(|r| r.background.as_ref())
            .map(|b| b.steps.as_slice())
            .unwrap_or_default();
        let rule_tags = rule.map(|r| r.tags.as_slice()).unwrap_or_default();

        for expanded in expand_scenario(outline, feature.path.as_ref()) {
            let expanded = expanded?;
            scenarios.push(Scenario {
                name: expanded.name.clone(),
                tags: feature
                    .tags
                    .iter()
                    .chain(rule_tags)
                    .chain(&expanded.tags)
                    .cloned()
                    .collect(),
                steps: background
                    .iter()
                    .chain(rule_background)
                    .chain(&expanded.steps)
                    .map(to_step_text)
                    .collect(),
            });
        }
        Ok(())
    };

    for scenario in &feature.scenarios {
        push(scenario, None)?;
    }
    for rule in &feature.rules {
        for scenario in &rule.scenarios {
            push(scenario, Some(rule))?;
        }
    }
    Ok(scenarios)
}

/// Converts a [`gherkin::Step`] into a [`StepText`].
fn to_step_text(step: &gherkin::Step) -> StepText {
    let text = StepText::new(step.value.clone());
    if let Some(table) = &step.table {
        text.with_argument(Argument::table(table.rows.clone()))
    } else if let Some(doc) = &step.docstring {
        text.with_argument(Argument::MultiLineText(dedent(doc)))
    } else {
        text
    }
}

/// Splits a doc string into lines, dropping surrounding blank lines and the
/// indentation common to all the lines.
fn dedent(doc: &str) -> Vec<String> {
    let lines = doc.lines().collect::<Vec<_>>();
    let blank = |l: &&str| l.trim().is_empty();
    let start = lines.iter().position(|l| !blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !blank(l)).map_or(start, |i| i + 1);
    let body = lines.get(start..end).unwrap_or_default();

    let indent = body
        .iter()
        .filter(|l| !blank(l))
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()).to_owned())
        .collect()
}

/// Expands [`Scenario`] [`Examples`] into one [`gherkin::Scenario`] per
/// example row, substituting `<name>` placeholders in its name, step texts,
/// doc strings and table cells. Scenarios without [`Examples`] are returned
/// as is.
///
/// [`Examples`]: gherkin::Examples
/// [`Scenario`]: gherkin::Scenario
fn expand_scenario(
    scenario: &gherkin::Scenario,
    path: Option<&PathBuf>,
) -> Vec<Result<gherkin::Scenario, ExpandExamplesError>> {
    if scenario.examples.is_empty() {
        return vec![Ok(scenario.clone())];
    }

    scenario
        .examples
        .iter()
        .filter_map(|ex| {
            ex.table
                .as_ref()?
                .rows
                .split_first()
                .map(|(h, v)| (h, v, ex))
        })
        .flat_map(|(header, vals, example)| {
            vals.iter()
                .map(|v| header.iter().zip(v))
                .zip(iter::repeat(example.tags.iter()))
        })
        .map(|(row, tags)| {
            let replace_templates = |str: &str, pos| {
                let mut err = None;
                let replaced = regex!(r"<([^>\s]+)>")
                    .replace_all(str, |cap: &regex::Captures<'_>| {
                        let name = cap.get(1).map_or("", |m| m.as_str());
                        row.clone()
                            .find_map(|(k, v)| {
                                (name == k).then_some(v.as_str())
                            })
                            .unwrap_or_else(|| {
                                err = Some(ExpandExamplesError {
                                    pos,
                                    name: name.to_owned(),
                                    path: path.cloned(),
                                });
                                ""
                            })
                    })
                    .into_owned();
                err.map_or(Ok(replaced), Err)
            };

            let mut expanded = scenario.clone();
            expanded.examples.clear();
            expanded.tags.extend(tags.cloned());
            expanded.name =
                replace_templates(&expanded.name, expanded.position)?;
            for s in &mut expanded.steps {
                for value in iter::once(&mut s.value)
                    .chain(s.docstring.iter_mut())
                    .chain(s.table.iter_mut().flat_map(|t| {
                        t.rows.iter_mut().flat_map(|r| r.iter_mut())
                    }))
                {
                    *value = replace_templates(value, s.position)?;
                }
            }
            Ok(expanded)
        })
        .collect()
}
