// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Call`] view handed to a step handler.

use std::{any::Any, cell::RefMut};

use anyhow::{anyhow, Context as _};
use linked_hash_map::LinkedHashMap;

use crate::{
    argument::{DataTable, DATA_TABLE, MULTI_LINE},
    fixture::{Fixture, RunContext, CONTEXT},
    Value,
};

/// Arguments of a single step handler invocation.
///
/// Holds only what the handler declared: converted captures, the structured
/// argument, and the fixtures it depends on.
#[derive(Debug)]
pub struct Call<'a> {
    /// Step text being executed.
    step: &'a str,

    /// Converted captures and structured argument.
    args: &'a LinkedHashMap<String, Value>,

    /// Declared fixtures.
    fixtures: LinkedHashMap<&'a str, &'a Fixture>,
}

impl<'a> Call<'a> {
    /// Creates a new [`Call`].
    #[must_use]
    pub const fn new(
        step: &'a str,
        args: &'a LinkedHashMap<String, Value>,
        fixtures: LinkedHashMap<&'a str, &'a Fixture>,
    ) -> Self {
        Self { step, args, fixtures }
    }

    /// Returns the step text being executed.
    #[must_use]
    pub const fn step(&self) -> &'a str {
        self.step
    }

    /// Returns all the bound arguments, in declaration order.
    #[must_use]
    pub const fn args(&self) -> &'a LinkedHashMap<String, Value> {
        self.args
    }

    /// Returns the argument bound to the given parameter.
    ///
    /// # Errors
    ///
    /// If no such argument is bound.
    pub fn arg(&self, name: &str) -> anyhow::Result<&'a Value> {
        self.args.get(name).ok_or_else(|| {
            anyhow!("no argument `{name}` bound for step `{}`", self.step)
        })
    }

    /// Returns the text of a [`Value::Str`] argument.
    ///
    /// # Errors
    ///
    /// If the argument is missing or isn't a string.
    pub fn str(&self, name: &str) -> anyhow::Result<&'a str> {
        let value = self.arg(name)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(name, "string", value))
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// If the argument is missing or isn't an integer.
    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        let value = self.arg(name)?;
        value.as_int().ok_or_else(|| mismatch(name, "integer", value))
    }

    /// Returns a float argument, widening integers.
    ///
    /// # Errors
    ///
    /// If the argument is missing or isn't a number.
    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        let value = self.arg(name)?;
        value.as_float().ok_or_else(|| mismatch(name, "float", value))
    }

    /// Returns the step's [`DataTable`], cells formatted back into strings.
    ///
    /// # Errors
    ///
    /// If the [`DATA_TABLE`] slot isn't bound.
    pub fn data_table(&self) -> anyhow::Result<DataTable> {
        DataTable::try_from(self.arg(DATA_TABLE)?).map_err(|e| anyhow!(e))
    }

    /// Returns the lines of the step's multi-line text block.
    ///
    /// # Errors
    ///
    /// If the [`MULTI_LINE`] slot isn't bound.
    pub fn multi_line(&self) -> anyhow::Result<&'a [Value]> {
        let value = self.arg(MULTI_LINE)?;
        value.as_list().ok_or_else(|| mismatch(MULTI_LINE, "list", value))
    }

    /// Mutably borrows the declared fixture with the given `name` as `T`.
    ///
    /// # Errors
    ///
    /// If the handler didn't declare the fixture, or it isn't a `T`, or it's
    /// already borrowed.
    pub fn fixture<T: Any>(&self, name: &str) -> anyhow::Result<RefMut<'a, T>> {
        let fixture: &'a Fixture =
            self.fixtures.get(name).copied().ok_or_else(|| {
                anyhow!(
                    "fixture `{name}` is not declared by step `{}`",
                    self.step,
                )
            })?;
        fixture
            .borrow_mut::<T>()
            .with_context(|| format!("fixture `{name}`"))
    }

    /// Shortcut for borrowing the [`CONTEXT`] fixture as a [`RunContext`].
    ///
    /// # Errors
    ///
    /// See [`Call::fixture()`].
    pub fn context(&self) -> anyhow::Result<RefMut<'a, RunContext>> {
        self.fixture(CONTEXT)
    }
}

/// Builds an error of the `name`d argument not being of the `expected` kind.
fn mismatch(name: &str, expected: &str, actual: &Value) -> anyhow::Error {
    anyhow!("argument `{name}` is a {}, not a {expected}", actual.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LinkedHashMap<String, Value> {
        let mut args = LinkedHashMap::new();
        _ = args.insert("num".to_owned(), Value::Int(3));
        _ = args.insert("name".to_owned(), Value::from("Bob"));
        _ = args.insert(
            DATA_TABLE.to_owned(),
            Value::from(vec![vec![Value::Int(1), Value::Int(2)]]),
        );
        args
    }

    #[test]
    fn typed_accessors() {
        let args = args();
        let call = Call::new("I have 3", &args, LinkedHashMap::new());
        assert_eq!(call.step(), "I have 3");
        assert_eq!(call.int("num").unwrap(), 3);
        assert_eq!(call.float("num").unwrap(), 3.0);
        assert_eq!(call.str("name").unwrap(), "Bob");
        assert!(call.int("name").is_err());
        assert!(call.arg("missing").is_err());
        assert!(call.multi_line().is_err());
        assert_eq!(call.data_table().unwrap().raw()[0], vec!["1", "2"]);
    }

    #[test]
    fn only_declared_fixtures_are_reachable() {
        let args = LinkedHashMap::new();
        let context = Fixture::new(RunContext::default());
        let mut fixtures = LinkedHashMap::new();
        _ = fixtures.insert(CONTEXT, &context);
        let call = Call::new("step", &args, fixtures);

        _ = call.context().unwrap().insert("x".into(), Value::Int(1));
        assert_eq!(call.context().unwrap().get("x"), Some(&Value::Int(1)));

        let err = call.fixture::<u32>("db").unwrap_err();
        assert!(err.to_string().contains("not declared"), "{err}");
    }
}
