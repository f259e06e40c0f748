// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed placeholders: [`ParameterType`]s and their [`Converter`]s.
//!
//! A placeholder `{name:key}` looks `key` up among the built-in types and the
//! extra types supplied on registration. The type contributes a regex
//! sub-pattern to the compiled [`StepPattern`] and a default [`Converter`]
//! used by the binder.
//!
//! [`StepPattern`]: super::StepPattern

use std::{fmt, sync::Arc};

use anyhow::{anyhow, Context as _};
use itertools::Itertools as _;

use crate::Value;

/// Conversion of a raw captured substring into a [`Value`].
pub type Converter = Arc<dyn Fn(&str) -> anyhow::Result<Value> + Send + Sync>;

/// Named placeholder type usable as `{name:key}` inside a step template.
#[derive(Clone)]
pub struct ParameterType {
    /// Lookup key of this type.
    name: String,

    /// Regex sub-pattern matched by a placeholder of this type.
    ///
    /// Must not contain named capturing groups.
    regex: String,

    /// Default conversion of a matched placeholder.
    converter: Converter,

    /// Text matched by [`ParameterType::regex`], standing for any value of
    /// this type when looking for ambiguous templates.
    sample: String,
}

impl fmt::Debug for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterType")
            .field("name", &self.name)
            .field("regex", &self.regex)
            .finish_non_exhaustive()
    }
}

impl ParameterType {
    /// Creates a custom [`ParameterType`] out of a regex sub-pattern and a
    /// conversion function.
    #[must_use]
    pub fn new<F>(
        name: impl Into<String>,
        regex: impl Into<String>,
        convert: F,
    ) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            regex: regex.into(),
            converter: Arc::new(convert),
            sample: "x".into(),
        }
    }

    /// Sets the text standing for any value of this [`ParameterType`] when
    /// looking for ambiguous templates.
    ///
    /// Defaults to `x`, so it should be set whenever the regex doesn't match
    /// `x`.
    #[must_use]
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = sample.into();
        self
    }

    /// Creates a [`ParameterType`] matching exactly one of the given literal
    /// `alternatives` (case-sensitive), converted into a [`Value::Str`].
    #[must_use]
    pub fn choice<I, S>(name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alternatives =
            alternatives.into_iter().map(Into::into).collect::<Vec<_>>();
        let regex = format!(
            "(?:{})",
            alternatives.iter().map(|a| regex::escape(a)).join("|"),
        );
        let sample = alternatives.first().cloned().unwrap_or_default();
        let name = name.into();
        let type_name = name.clone();
        Self::new(name, regex, move |s| {
            if alternatives.iter().any(|a| a == s) {
                Ok(Value::from(s))
            } else {
                Err(anyhow!(
                    "unknown value `{s}` for `{type_name}`, \
                     expected one of: {}",
                    alternatives.iter().join(", "),
                ))
            }
        })
        .with_sample(sample)
    }

    /// Returns the lookup key of this [`ParameterType`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the regex sub-pattern of this [`ParameterType`].
    #[must_use]
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// Returns the default [`Converter`] of this [`ParameterType`].
    #[must_use]
    pub const fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Returns the text standing for any value of this [`ParameterType`].
    #[must_use]
    pub fn sample(&self) -> &str {
        &self.sample
    }

    /// Built-in [`ParameterType`]s, looked up after the extra ones.
    ///
    /// Numbers are matched in their canonical form only (no `+` sign, no
    /// leading zeros, no exponent, no trailing fractional zeros), so the
    /// [`Value`] they're converted into formats back into the same text.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        const INT: &str = r"(?:0|-?[1-9]\d*)";
        const FLOAT: &str = r"-?(?:0|[1-9]\d*)(?:\.\d*[1-9])?";
        const WORD: &str = r"\w+";
        const STRING: &str = r".+?";

        vec![
            Self::new("d", INT, integer).with_sample("0"),
            Self::new("int", INT, integer).with_sample("0"),
            Self::new("f", FLOAT, float).with_sample("0"),
            Self::new("float", FLOAT, float).with_sample("0"),
            Self::new("w", WORD, string),
            Self::new("word", WORD, string),
            Self::new("s", STRING, string),
            Self::new("string", STRING, string),
        ]
    }
}

/// Identity conversion applied to untyped parameters.
///
/// # Errors
///
/// Never.
pub fn string(s: &str) -> anyhow::Result<Value> {
    Ok(Value::from(s))
}

/// Converts into a [`Value::Int`].
///
/// # Errors
///
/// If `s` is not a valid [`i64`] written in its canonical form.
pub fn integer(s: &str) -> anyhow::Result<Value> {
    let value = s
        .parse::<i64>()
        .map(Value::Int)
        .with_context(|| format!("`{s}` is not an integer"))?;
    canonical(s, value, "integer")
}

/// Converts into a [`Value::Float`].
///
/// # Errors
///
/// If `s` is not a valid [`f64`] written in its canonical form.
pub fn float(s: &str) -> anyhow::Result<Value> {
    let value = s
        .parse::<f64>()
        .map(Value::Float)
        .with_context(|| format!("`{s}` is not a float"))?;
    canonical(s, value, "float")
}

/// Ensures the converted `value` formats back into the `raw` text.
fn canonical(raw: &str, value: Value, kind: &str) -> anyhow::Result<Value> {
    anyhow::ensure!(
        value.to_string() == raw,
        "`{}` is not a canonical {}, expected `{}`",
        raw,
        kind,
        value,
    );
    Ok(value)
}

/// Converts `true`/`yes`/`false`/`no` (case-insensitively) into a
/// [`Value::Bool`].
///
/// # Errors
///
/// On any other input.
pub fn boolean(s: &str) -> anyhow::Result<Value> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(Value::Bool(true)),
        "false" | "no" => Ok(Value::Bool(false)),
        _ => Err(anyhow!("`{s}` is not a boolean")),
    }
}

/// Wraps a plain conversion function into a [`Converter`].
#[must_use]
pub fn converter<F>(convert: F) -> Converter
where
    F: Fn(&str) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(convert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trips_through_display() {
        for raw in ["42", "-3", "0"] {
            let value = integer(raw).unwrap();
            assert_eq!(value.to_string(), raw);
        }
        assert!(integer("4.2").is_err());
    }

    #[test]
    fn float_round_trips_through_display() {
        for raw in ["2.5", "-0.125", "1000", "0"] {
            let value = float(raw).unwrap();
            assert_eq!(value.to_string(), raw);
        }
        assert_eq!(float("2.5").unwrap(), Value::Float(2.5));
        assert!(float("abc").is_err());
    }

    #[test]
    fn non_canonical_numbers_are_rejected() {
        for raw in ["+5", "007", "-0"] {
            let err = integer(raw).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("not a canonical integer"), "{message}");
        }
        for raw in ["2.50", "1e3", "+1.5", ".5"] {
            assert!(float(raw).is_err(), "`{raw}` converted");
        }
    }

    #[test]
    fn builtin_regexes_match_canonical_numbers_only() {
        let types = ParameterType::builtins();
        let re = |key: &str| {
            let ty = types.iter().find(|t| t.name() == key).unwrap();
            regex::Regex::new(&format!("^{}$", ty.regex())).unwrap()
        };
        let (int, float) = (re("d"), re("f"));

        for raw in ["0", "42", "-3"] {
            assert!(int.is_match(raw), "`{raw}` not matched");
        }
        for raw in ["+5", "007", "-0", "4.2"] {
            assert!(!int.is_match(raw), "`{raw}` matched");
        }
        for raw in ["0", "2.5", "-0.125", "1000"] {
            assert!(float.is_match(raw), "`{raw}` not matched");
        }
        for raw in ["2.50", "1e3", "+1.5", ".5", "01.5"] {
            assert!(!float.is_match(raw), "`{raw}` matched");
        }
    }

    #[test]
    fn boolean_converts() {
        assert_eq!(boolean("Yes").unwrap(), Value::Bool(true));
        assert_eq!(boolean("false").unwrap(), Value::Bool(false));
        assert!(boolean("maybe").is_err());
    }

    #[test]
    fn choice_escapes_alternatives() {
        let ty = ParameterType::choice("op", ["add", "a+b"]);
        assert_eq!(ty.regex(), r"(?:add|a\+b)");
        assert_eq!(ty.sample(), "add");
        assert_eq!((ty.converter())("a+b").unwrap(), Value::from("a+b"));
        let err = (ty.converter())("sub").unwrap_err();
        assert!(err.to_string().contains("expected one of: add, a+b"));
    }

    #[test]
    fn builtins_cover_documented_keys() {
        let names = ParameterType::builtins()
            .iter()
            .map(|t| t.name().to_owned())
            .collect::<Vec<_>>();
        for key in ["d", "int", "f", "float", "w", "word", "s", "string"] {
            assert!(names.iter().any(|n| n == key), "missing `{key}`");
        }
    }
}
