// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step registrations ([`Step`]) and their compiled form
//! ([`StepDefinition`]).

use std::{fmt, sync::Arc};

use linked_hash_map::LinkedHashMap;

use crate::{
    argument::{DATA_TABLE, MULTI_LINE},
    error::PatternError,
};

use super::{
    call::Call,
    location::Location,
    parameter::{Converter, ParameterType},
    pattern::StepPattern,
};

/// Result of a step handler.
pub type StepResult = anyhow::Result<()>;

/// Step handler function.
pub type Handler = Arc<dyn Fn(&Call<'_>) -> StepResult + Send + Sync>;

/// Declared parameters of a handler, in declaration order, each with its
/// converter (if any).
pub type Parameters = LinkedHashMap<String, Option<Converter>>;

/// Registration of a step handler, as passed to [`Engine::register_step()`].
///
/// Handlers declare their parameters explicitly, once, at registration:
/// - [`Step::param()`] for a value captured by a template placeholder or a
///   structured argument slot;
/// - [`Step::fixture()`] for a value provided by a [`FixtureProvider`].
///
/// Classification happens at binding time, so both kinds simply populate the
/// same ordered parameter list.
///
/// # Example
///
/// ```rust
/// use cucumber_engine::{Engine, ParameterType, Step};
///
/// let mut engine = Engine::new();
/// engine
///     .register_step(
///         Step::new("I {operator:operator} them", |call| {
///             let op = call.str("operator")?;
///             call.context()?.insert("op".into(), op.into());
///             Ok(())
///         })
///         .with_type(ParameterType::choice("operator", ["add", "subtract"]))
///         .param("operator")
///         .fixture("context"),
///     )
///     .unwrap();
/// assert!(engine.find("I add them").is_some());
/// ```
///
/// [`Engine::register_step()`]: crate::Engine::register_step
/// [`FixtureProvider`]: crate::FixtureProvider
pub struct Step {
    /// Template of this step.
    pub(crate) template: String,

    /// Handler of this step.
    pub(crate) handler: Handler,

    /// Declared parameters.
    pub(crate) params: Parameters,

    /// Extra placeholder types available to the template.
    pub(crate) extra_types: Vec<ParameterType>,

    /// [`Location`] where this [`Step`] was created.
    pub(crate) location: Option<Location>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("template", &self.template)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("extra_types", &self.extra_types)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Step {
    /// Creates a new [`Step`] with the given `template` and `handler`, and no
    /// declared parameters.
    #[must_use]
    #[track_caller]
    pub fn new<F>(template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Call<'_>) -> StepResult + Send + Sync + 'static,
    {
        Self {
            template: template.into(),
            handler: Arc::new(handler),
            params: Parameters::new(),
            extra_types: Vec::new(),
            location: Some(Location::caller()),
        }
    }

    /// Declares a parameter converted with the default conversion: the
    /// placeholder type's one for typed placeholders, identity-to-string
    /// otherwise.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        _ = self.params.insert(name.into(), None);
        self
    }

    /// Declares a parameter converted with the given [`Converter`].
    ///
    /// On the [`DATA_TABLE`] and [`MULTI_LINE`] slots the converter applies
    /// to every cell or line.
    #[must_use]
    pub fn param_with(
        mut self,
        name: impl Into<String>,
        converter: Converter,
    ) -> Self {
        _ = self.params.insert(name.into(), Some(converter));
        self
    }

    /// Declares a dependency on the named fixture.
    #[must_use]
    pub fn fixture(self, name: impl Into<String>) -> Self {
        self.param(name)
    }

    /// Declares the [`DATA_TABLE`] slot parameter.
    #[must_use]
    pub fn data_table(self) -> Self {
        self.param(DATA_TABLE)
    }

    /// Declares the [`MULTI_LINE`] slot parameter.
    #[must_use]
    pub fn multi_line(self) -> Self {
        self.param(MULTI_LINE)
    }

    /// Makes the given [`ParameterType`] available to the template's
    /// placeholders, shadowing any built-in one of the same name.
    #[must_use]
    pub fn with_type(mut self, ty: ParameterType) -> Self {
        self.extra_types.push(ty);
        self
    }

    /// Overrides the [`Location`] recorded for this [`Step`].
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Compiles this [`Step`] into a [`StepDefinition`].
    ///
    /// # Errors
    ///
    /// If the template is malformed.
    pub fn compile(self) -> Result<StepDefinition, PatternError> {
        let pattern =
            StepPattern::compile_with(&self.template, &self.extra_types)?;
        Ok(StepDefinition {
            pattern,
            handler: self.handler,
            params: self.params,
            location: self.location,
        })
    }
}

/// Immutable record of a registered step: handler, compiled pattern and
/// declared parameters.
#[derive(Clone)]
pub struct StepDefinition {
    /// Compiled template.
    pattern: StepPattern,

    /// Handler to invoke.
    handler: Handler,

    /// Declared parameters.
    params: Parameters,

    /// Where this definition was registered.
    location: Option<Location>,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("pattern", &self.pattern)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl StepDefinition {
    /// Returns the compiled [`StepPattern`].
    #[must_use]
    pub const fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Returns the [`Handler`].
    #[must_use]
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Returns the declared [`Parameters`].
    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// Checks whether a parameter with the given `name` is declared.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns the [`Location`] of the registration, if known.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }
}
