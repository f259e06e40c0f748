// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of the engine, organized by the phase raising them.
//!
//! - [`pattern`] - malformed step templates, fatal at registration
//! - [`binding`] - step text vs. declared parameters, collected
//! - [`scenario`] - failures of a single scenario run
//!
//! Ambiguous registrations are reported with [`AmbiguousStepError`], which
//! lives next to the step collection detecting them.
//!
//! [`AmbiguousStepError`]: crate::step::AmbiguousStepError

pub mod binding;
pub mod pattern;
pub mod scenario;

use std::{fmt, path::PathBuf};

use derive_more::with_trait::Error;

use crate::diagnostics::CollectionReport;

pub use self::{
    binding::BindingError,
    pattern::PatternError,
    scenario::{PanicPayloadExt, ScenarioError},
};

/// Failed collection pass: no scenario of the suite may run.
#[derive(Clone, Debug, Error)]
pub struct CollectionError {
    /// Everything found wrong while collecting.
    #[error(not(source))]
    pub report: CollectionReport,

    /// Path of the written proposal file for the missing steps, if any.
    #[error(not(source))]
    pub proposal: Option<PathBuf>,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report)?;
        if let Some(path) = &self.proposal {
            write!(
                f,
                "\nProposal for the missing steps written to: {}",
                path.display(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_error_lists_everything_then_the_proposal() {
        let err = CollectionError {
            report: CollectionReport {
                errors: vec![
                    "Similar step name was already declared: a / a".into(),
                ],
                missing_steps: vec!["I fly".into()],
            },
            proposal: Some(PathBuf::from("steps_proposal.rs")),
        };
        let out = err.to_string();
        let errors = out.find("Similar step name").unwrap();
        let missing = out.find("I fly").unwrap();
        let notice = out.find("steps_proposal.rs").unwrap();
        assert!(errors < missing && missing < notice, "{out}");
    }
}
