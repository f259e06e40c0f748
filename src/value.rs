// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dynamically typed [`Value`]s produced by parameter converters.

use derive_more::with_trait::Display;
use itertools::Itertools as _;

/// Value of a converted step parameter or of a [`RunContext`] entry.
///
/// [`Display`] is the default formatter: for every built-in parameter type
/// formatting a converted capture reproduces the captured text.
///
/// [`RunContext`]: crate::RunContext
#[derive(Clone, Debug, Display, PartialEq)]
pub enum Value {
    /// Free-form text.
    #[display("{_0}")]
    Str(String),

    /// Signed integer.
    #[display("{_0}")]
    Int(i64),

    /// Floating point number.
    #[display("{_0}")]
    Float(f64),

    /// Boolean flag.
    #[display("{_0}")]
    Bool(bool),

    /// Ordered sequence of values (table rows, multi-line text, ...).
    #[display("[{}]", _0.iter().join(", "))]
    List(Vec<Value>),
}

impl Value {
    /// Returns the text of a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer of a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number of a [`Value::Float`], widening a [`Value::Int`].
    #[expect(
        clippy::cast_precision_loss,
        reason = "step integers are small enough"
    )]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the flag of a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the items of a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns a human-readable name of this [`Value`]'s kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::List(_) => "list",
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
