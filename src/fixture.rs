// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fixtures: named values a step handler depends on, which can't be derived
//! from the step text itself.
//!
//! The engine only needs a [`FixtureProvider`] resolving names into
//! [`Fixture`]s once per scenario. [`Fixtures`] is the simple
//! factory-per-name implementation shipped with the crate.

use std::{
    any::{self, Any},
    cell::{RefCell, RefMut},
    collections::{BTreeMap, HashMap},
    fmt,
    rc::Rc,
    sync::Arc,
};

use derive_more::with_trait::{Deref, DerefMut};

use crate::Value;

/// Name of the [`RunContext`] fixture registered by [`Fixtures::default()`].
pub const CONTEXT: &str = "context";

/// Mutable mapping shared by all the steps of one scenario run.
///
/// Created fresh per scenario and dropped at its end.
#[derive(Clone, Debug, Default, Deref, DerefMut, PartialEq)]
pub struct RunContext(HashMap<String, Value>);

/// Fixture value resolved for one scenario run.
///
/// Clones share the same underlying value, so mutations made by one step are
/// visible to the following ones.
#[derive(Clone)]
pub struct Fixture {
    /// Shared value.
    value: Rc<RefCell<Box<dyn Any>>>,

    /// Name of the value's type, for diagnostics.
    type_name: &'static str,
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fixture").field(&self.type_name).finish()
    }
}

impl Fixture {
    /// Wraps the given `value` into a [`Fixture`].
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(Box::new(value))),
            type_name: any::type_name::<T>(),
        }
    }

    /// Returns the name of the wrapped value's type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Mutably borrows the wrapped value as `T`.
    ///
    /// # Errors
    ///
    /// If the value isn't a `T` or is already borrowed.
    pub fn borrow_mut<T: Any>(&self) -> anyhow::Result<RefMut<'_, T>> {
        let value = self.value.try_borrow_mut().map_err(|_| {
            anyhow::anyhow!(
                "fixture of type `{}` is already borrowed",
                self.type_name,
            )
        })?;
        RefMut::filter_map(value, |v| v.downcast_mut::<T>()).map_err(|_| {
            anyhow::anyhow!(
                "fixture is a `{}`, not a `{}`",
                self.type_name,
                any::type_name::<T>(),
            )
        })
    }
}

/// Container resolving fixtures by name.
///
/// Every call to [`FixtureProvider::resolve()`] is expected to produce a value
/// scoped to the scenario run it's made for.
pub trait FixtureProvider {
    /// Resolves the fixture with the given `name`, if known.
    fn resolve(&self, name: &str) -> Option<Fixture>;
}

/// Factory of a [`Fixture`].
pub type Factory = Arc<dyn Fn() -> Fixture + Send + Sync>;

/// [`FixtureProvider`] building a fresh value per resolution out of a
/// factory registered per name.
///
/// Factories run lazily: only the names a scenario requires are built.
#[derive(Clone)]
pub struct Fixtures {
    factories: BTreeMap<String, Factory>,
}

impl fmt::Debug for Fixtures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Default for Fixtures {
    /// Creates [`Fixtures`] providing a fresh [`RunContext`] as [`CONTEXT`].
    fn default() -> Self {
        Self::empty().with(CONTEXT, RunContext::default)
    }
}

impl Fixtures {
    /// Creates [`Fixtures`] without any factory, not even [`CONTEXT`].
    #[must_use]
    pub const fn empty() -> Self {
        Self { factories: BTreeMap::new() }
    }

    /// Registers a factory for the fixture with the given `name`, replacing
    /// any previous one.
    #[must_use]
    pub fn with<T, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        _ = self
            .factories
            .insert(name.into(), Arc::new(move || Fixture::new(factory())));
        self
    }

    /// Returns the names of all the registered fixtures.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl FixtureProvider for Fixtures {
    fn resolve(&self, name: &str) -> Option<Fixture> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl<F> FixtureProvider for F
where
    F: Fn(&str) -> Option<Fixture>,
{
    fn resolve(&self, name: &str) -> Option<Fixture> {
        self(name)
    }
}

/// Fixtures resolved for one scenario run, keyed by name.
pub type Resolved = HashMap<String, Fixture>;
