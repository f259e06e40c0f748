// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Problems accumulated during a collection pass.

use std::fmt;

use derive_more::with_trait::{Display, From};

use crate::{error::BindingError, step::AmbiguousStepError};

/// Collected error.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum Diagnostic {
    /// Overlapping step registrations.
    Ambiguous(AmbiguousStepError),

    /// Step text not fitting its definition.
    Binding(BindingError),
}

/// Errors and missing steps of one collection pass.
///
/// Append-only until [`Diagnostics::clear()`]ed.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    /// Collected errors, in discovery order.
    errors: Vec<Diagnostic>,

    /// Step texts no definition matches, each one recorded once.
    missing_steps: Vec<String>,
}

impl Diagnostics {
    /// Creates new empty [`Diagnostics`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn add_error(&mut self, error: impl Into<Diagnostic>) {
        let error = error.into();
        tracing::warn!("{error}");
        self.errors.push(error);
    }

    /// Records a step text without a matching definition, unless already
    /// recorded.
    pub fn add_missing_step(&mut self, text: &str) {
        if !self.missing_steps.iter().any(|s| s == text) {
            tracing::warn!("Step not found: {text}");
            self.missing_steps.push(text.to_owned());
        }
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Returns the missing step texts, in encounter order.
    #[must_use]
    pub fn missing_steps(&self) -> &[String] {
        &self.missing_steps
    }

    /// Checks whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.missing_steps.is_empty()
    }

    /// Renders everything collected so far into a [`CollectionReport`].
    #[must_use]
    pub fn report(&self) -> CollectionReport {
        CollectionReport {
            errors: self.errors.iter().map(ToString::to_string).collect(),
            missing_steps: self.missing_steps.clone(),
        }
    }

    /// Drops everything collected.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.missing_steps.clear();
    }
}

/// Result of a collection pass, as shown to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Rendered errors.
    pub errors: Vec<String>,

    /// Step texts without a matching definition.
    pub missing_steps: Vec<String>,
}

impl CollectionReport {
    /// Checks whether the collection pass succeeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.missing_steps.is_empty()
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.errors.is_empty() {
            writeln!(f, "Errors found during collection:")?;
            for err in &self.errors {
                writeln!(f, "  {err}")?;
            }
        }
        if !self.missing_steps.is_empty() {
            writeln!(f, "Missing steps:")?;
            for step in &self.missing_steps {
                writeln!(f, "  {step}")?;
            }
        }
        Ok(())
    }
}
