// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle [`Hooks`] invoked around scenarios and steps.

use std::{fmt, sync::Arc};

use crate::{binder::BoundStep, scenario::ScenarioRun};

/// Hook invoked around a whole [`ScenarioRun`].
pub type ScenarioHook = Arc<dyn Fn(&ScenarioRun) + Send + Sync>;

/// Hook invoked around a single [`BoundStep`] of a [`ScenarioRun`].
pub type StepHook = Arc<dyn Fn(&ScenarioRun, &BoundStep) + Send + Sync>;

/// Set of optional lifecycle hooks.
///
/// - `before_scenario` runs once the scenario is [`Running`], before its
///   first step.
/// - `after_scenario` runs after the last executed step, whether the
///   scenario passed or failed.
/// - `before_step` runs before every step handler.
/// - `after_step` runs after every step handler that succeeded.
///
/// [`Running`]: crate::State::Running
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) before_scenario: Option<ScenarioHook>,
    pub(crate) after_scenario: Option<ScenarioHook>,
    pub(crate) before_step: Option<StepHook>,
    pub(crate) after_step: Option<StepHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_scenario", &self.before_scenario.is_some())
            .field("after_scenario", &self.after_scenario.is_some())
            .field("before_step", &self.before_step.is_some())
            .field("after_step", &self.after_step.is_some())
            .finish()
    }
}

impl Hooks {
    /// Creates empty [`Hooks`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook running before each scenario's steps.
    #[must_use]
    pub fn before_scenario<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ScenarioRun) + Send + Sync + 'static,
    {
        self.before_scenario = Some(Arc::new(hook));
        self
    }

    /// Sets the hook running after each scenario's steps.
    #[must_use]
    pub fn after_scenario<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ScenarioRun) + Send + Sync + 'static,
    {
        self.after_scenario = Some(Arc::new(hook));
        self
    }

    /// Sets the hook running before each step.
    #[must_use]
    pub fn before_step<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ScenarioRun, &BoundStep) + Send + Sync + 'static,
    {
        self.before_step = Some(Arc::new(hook));
        self
    }

    /// Sets the hook running after each successful step.
    #[must_use]
    pub fn after_step<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ScenarioRun, &BoundStep) + Send + Sync + 'static,
    {
        self.after_step = Some(Arc::new(hook));
        self
    }
}
