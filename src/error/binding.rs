// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of binding a step text to a step definition.

use derive_more::with_trait::{Display, Error};

/// Mismatch between a step text and the parameters its definition declares.
///
/// Collected during the collection pass rather than raised.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum BindingError {
    /// Template captures a name the handler doesn't declare.
    #[display("For step {step} wrong parameters found: {name}")]
    UndeclaredCapture {
        /// Step text.
        step: String,
        /// Captured name.
        name: String,
    },

    /// Template captures one of the reserved structured-argument slot names.
    #[display("For step {step} reserved parameter name {name} found")]
    ReservedCapture {
        /// Step text.
        step: String,
        /// Reserved name.
        name: String,
    },

    /// Step carries a structured argument the handler has no slot for.
    #[display("For step {step} argument found, but not parameter: {slot}")]
    UnexpectedArgument {
        /// Step text.
        step: String,
        /// Slot name of the supplied argument.
        slot: &'static str,
    },

    /// Handler declares a structured-argument slot the step doesn't supply.
    #[display("For step {step} {slot} parameter found, but not the {slot}")]
    MissingArgument {
        /// Step text.
        step: String,
        /// Declared slot name.
        slot: &'static str,
    },

    /// Declared converter rejected the captured value.
    #[display("For step {step} parameter {name} failed to convert: {message}")]
    Conversion {
        /// Step text.
        step: String,
        /// Parameter name.
        name: String,
        /// Converter failure.
        message: String,
    },
}

impl BindingError {
    /// Returns the step text this [`BindingError`] relates to.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::UndeclaredCapture { step, .. }
            | Self::ReservedCapture { step, .. }
            | Self::UnexpectedArgument { step, .. }
            | Self::MissingArgument { step, .. }
            | Self::Conversion { step, .. } => step,
        }
    }
}
