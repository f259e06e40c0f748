// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step registration: templates compiled into [`StepPattern`]s, stored as
//! [`StepDefinition`]s in a [`Collection`].
//!
//! - [`pattern`]: template compilation and matching
//! - [`parameter`]: placeholder types and value converters
//! - [`definition`]: registrations and their compiled form
//! - [`collection`]: ordered storage with ambiguity detection
//! - [`call`]: view of arguments handed to a handler
//! - [`location`]: source location of a registration

pub mod call;
pub mod collection;
pub mod definition;
pub mod error;
pub mod location;
pub mod parameter;
pub mod pattern;

pub use self::{
    call::Call,
    collection::Collection,
    definition::{Handler, Parameters, Step, StepDefinition, StepResult},
    error::AmbiguousStepError,
    location::Location,
    parameter::{Converter, ParameterType},
    pattern::{Captures, Placeholder, StepPattern},
};
