// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors failing a single scenario.

use std::any::Any;

use derive_more::with_trait::{Display, Error};

use crate::scenario::State;

/// Failure of one scenario. Never affects its siblings.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum ScenarioError {
    /// Scenario has unmatched steps or binding errors.
    #[display(
        "Scenario `{scenario}` has {missing} missing step(s) and \
         {errors} binding error(s)"
    )]
    Unbound {
        /// Scenario name.
        scenario: String,
        /// Number of steps without a matching definition.
        missing: usize,
        /// Number of binding errors.
        errors: usize,
    },

    /// Required fixture couldn't be resolved.
    #[display("Fixture not found: {name} (scenario `{scenario}`)")]
    DependencyResolution {
        /// Scenario name.
        scenario: String,
        /// Fixture name.
        name: String,
    },

    /// Step handler returned an error or panicked.
    #[display("Step `{step}` of scenario `{scenario}` failed: {message}")]
    StepExecution {
        /// Scenario name.
        scenario: String,
        /// Step text.
        step: String,
        /// Position of the step in the scenario.
        index: usize,
        /// Handler failure or panic message.
        message: String,
    },

    /// Lifecycle operation invoked in a wrong [`State`].
    #[display("Scenario `{scenario}` cannot {operation} in state {state:?}")]
    InvalidState {
        /// Scenario name.
        scenario: String,
        /// Attempted operation.
        operation: &'static str,
        /// Current [`State`].
        state: State,
    },
}

impl ScenarioError {
    /// Returns the name of the failed scenario.
    #[must_use]
    pub fn scenario(&self) -> &str {
        match self {
            Self::Unbound { scenario, .. }
            | Self::DependencyResolution { scenario, .. }
            | Self::StepExecution { scenario, .. }
            | Self::InvalidState { scenario, .. } => scenario,
        }
    }
}

/// Conversion of panic payloads into readable messages.
pub trait PanicPayloadExt {
    /// Converts this panic payload into a readable message.
    fn to_readable_string(&self) -> String;
}

impl PanicPayloadExt for dyn Any + Send {
    fn to_readable_string(&self) -> String {
        if let Some(s) = self.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = self.downcast_ref::<&str>() {
            (*s).to_owned()
        } else {
            "Unknown panic payload".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_ext() {
        let string: Box<dyn Any + Send> = Box::new("string panic".to_owned());
        assert_eq!(string.to_readable_string(), "string panic");

        let str: Box<dyn Any + Send> = Box::new("str panic");
        assert_eq!(str.to_readable_string(), "str panic");

        let unknown: Box<dyn Any + Send> = Box::new(42_i32);
        assert_eq!(unknown.to_readable_string(), "Unknown panic payload");
    }

    #[test]
    fn display() {
        let err = ScenarioError::DependencyResolution {
            scenario: "Adding".into(),
            name: "db".into(),
        };
        assert_eq!(
            err.to_string(),
            "Fixture not found: db (scenario `Adding`)",
        );
        assert_eq!(err.scenario(), "Adding");

        let err = ScenarioError::InvalidState {
            scenario: "Adding".into(),
            operation: "run",
            state: State::New,
        };
        assert_eq!(
            err.to_string(),
            "Scenario `Adding` cannot run in state New",
        );
    }
}
