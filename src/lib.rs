// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step registry and scenario execution engine for [Gherkin]-driven BDD
//! tests.
//!
//! Steps are registered on an [`Engine`] as text templates with typed
//! placeholders (`I have {n:d} cucumbers`). Every [`Scenario`] is then
//! collected: its step texts are matched against the registered templates
//! and bound to typed arguments, and every problem of the whole suite
//! (ambiguous templates, missing steps, binding errors) is reported at once,
//! before any scenario runs. Collected scenarios run step by step with the
//! fixtures they depend on.
//!
//! The `runner` feature (enabled by default) adds a host [`Runner`] reading
//! `.feature` files.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(nonstandard_style, rustdoc::broken_intra_doc_links)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(missing_docs, unreachable_pub, unused_results)]

pub mod argument;
pub mod binder;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod hooks;
pub mod proposal;
pub mod scenario;
pub mod step;
pub mod value;

#[cfg(feature = "runner")]
pub mod cli;
#[cfg(feature = "runner")]
pub mod feature;
#[cfg(feature = "runner")]
pub mod runner;
#[cfg(feature = "runner")]
pub mod tag;

#[cfg(feature = "runner")]
pub use gherkin;

#[cfg(feature = "runner")]
#[doc(inline)]
pub use self::runner::{Runner, Summary};
#[doc(inline)]
pub use self::{
    argument::{Argument, DataTable},
    binder::BoundStep,
    diagnostics::{CollectionReport, Diagnostics},
    engine::{Config, Engine, TagHandler},
    error::{
        BindingError, CollectionError, PatternError, ScenarioError,
    },
    fixture::{Fixture, FixtureProvider, Fixtures, Resolved, RunContext},
    hooks::Hooks,
    scenario::{Scenario, ScenarioRun, State, StepText},
    step::{
        AmbiguousStepError, Call, Location, ParameterType, Step,
        StepDefinition,
    },
    value::Value,
};
