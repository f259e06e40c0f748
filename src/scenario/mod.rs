// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Scenario`]s as produced by a specification parser, and their
//! [`ScenarioRun`]s.

pub mod run;

use crate::argument::Argument;

pub use self::run::{ScenarioRun, State};

/// Scenario to execute: an ordered list of [`StepText`]s plus tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scenario {
    /// Name of this scenario.
    pub name: String,

    /// Tags of this scenario, possibly `@`-prefixed.
    pub tags: Vec<String>,

    /// Steps in document order.
    pub steps: Vec<StepText>,
}

impl Scenario {
    /// Creates a new [`Scenario`] without any steps.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Appends a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a plain step.
    #[must_use]
    pub fn step(mut self, text: impl Into<String>) -> Self {
        self.steps.push(StepText::new(text));
        self
    }

    /// Appends a step carrying a structured [`Argument`].
    #[must_use]
    pub fn step_with(
        mut self,
        text: impl Into<String>,
        argument: Argument,
    ) -> Self {
        self.steps.push(StepText::new(text).with_argument(argument));
        self
    }
}

/// One step of a [`Scenario`]: sentence plus an optional structured
/// [`Argument`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepText {
    /// Sentence of this step, without its keyword.
    pub text: String,

    /// Attached data table or multi-line text, if any.
    pub argument: Option<Argument>,
}

impl StepText {
    /// Creates a new [`StepText`] without an [`Argument`].
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), argument: None }
    }

    /// Attaches the given `argument`.
    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.argument = Some(argument);
        self
    }
}
