// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binding of a [`StepText`] to the [`StepDefinition`] it matched.
//!
//! Every declared parameter of the definition ends up being exactly one of:
//! - a converted capture of a template placeholder;
//! - the structured [`Argument`] of the step;
//! - a dependency to be resolved by a [`FixtureProvider`].
//!
//! [`FixtureProvider`]: crate::FixtureProvider

use std::{collections::BTreeSet, fmt, sync::Arc};

use anyhow::anyhow;
use linked_hash_map::LinkedHashMap;

use crate::{
    argument::{Argument, RESERVED_NAMES},
    error::BindingError,
    fixture::Resolved,
    scenario::StepText,
    step::{parameter, Call, Converter, StepDefinition, StepResult},
    Value,
};

/// [`StepText`] bound to its [`StepDefinition`], ready to be invoked.
///
/// Built once while verifying a scenario, reused unchanged at run time.
#[derive(Clone)]
pub struct BoundStep {
    /// Step text.
    text: String,

    /// Matched definition.
    definition: Arc<StepDefinition>,

    /// Converted captures and structured argument, in declaration order.
    call_arguments: LinkedHashMap<String, Value>,

    /// Declared parameters left to fixtures.
    dependency_names: BTreeSet<String>,
}

impl fmt::Debug for BoundStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStep")
            .field("text", &self.text)
            .field("template", &self.definition.pattern().template())
            .field("call_arguments", &self.call_arguments)
            .field("dependency_names", &self.dependency_names)
            .finish()
    }
}

impl BoundStep {
    /// Returns the step text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the matched [`StepDefinition`].
    #[must_use]
    pub fn definition(&self) -> &Arc<StepDefinition> {
        &self.definition
    }

    /// Returns the converted captures and structured argument.
    #[must_use]
    pub const fn call_arguments(&self) -> &LinkedHashMap<String, Value> {
        &self.call_arguments
    }

    /// Returns the names of the fixtures this step depends on.
    #[must_use]
    pub const fn dependency_names(&self) -> &BTreeSet<String> {
        &self.dependency_names
    }

    /// Invokes the handler with the call arguments and the declared fixtures
    /// picked out of the `resolved` ones.
    ///
    /// # Errors
    ///
    /// If a declared fixture isn't among the `resolved` ones, or the handler
    /// itself fails.
    pub fn invoke(&self, resolved: &Resolved) -> StepResult {
        let mut fixtures = LinkedHashMap::new();
        for name in &self.dependency_names {
            let fixture = resolved
                .get(name)
                .ok_or_else(|| anyhow!("Fixture not found: {name}"))?;
            _ = fixtures.insert(name.as_str(), fixture);
        }

        tracing::info!("{}", self.text);
        tracing::debug!(
            template = self.definition.pattern().template(),
            location = ?self.definition.location(),
            parameters = ?self.call_arguments,
            fixtures = ?self.dependency_names,
            "calling step handler",
        );

        let call = Call::new(&self.text, &self.call_arguments, fixtures);
        (self.definition.handler())(&call)
    }
}

/// Binds the `step` to the `definition` it matched.
///
/// Validity checks run first and all their failures are reported together.
/// Conversions run only once the step is valid, again reporting every
/// failing parameter.
///
/// # Errors
///
/// Every [`BindingError`] found.
pub fn bind(
    step: &StepText,
    definition: &Arc<StepDefinition>,
) -> Result<BoundStep, Vec<BindingError>> {
    let text = step.text.as_str();
    let captures = definition.pattern().captures(text).unwrap_or_default();
    let argument = step.argument.as_ref();

    let mut errors = Vec::new();
    for name in captures.keys() {
        if !definition.declares(name) {
            errors.push(BindingError::UndeclaredCapture {
                step: text.to_owned(),
                name: name.clone(),
            });
        }
    }
    for name in RESERVED_NAMES {
        if captures.contains_key(name) {
            errors.push(BindingError::ReservedCapture {
                step: text.to_owned(),
                name: name.to_owned(),
            });
        }
    }
    if let Some(arg) = argument {
        if !definition.declares(arg.slot()) {
            errors.push(BindingError::UnexpectedArgument {
                step: text.to_owned(),
                slot: arg.slot(),
            });
        }
    }
    for slot in RESERVED_NAMES {
        if definition.declares(slot)
            && argument.map(Argument::slot) != Some(slot)
        {
            errors.push(BindingError::MissingArgument {
                step: text.to_owned(),
                slot,
            });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut call_arguments = LinkedHashMap::new();
    let mut dependency_names = BTreeSet::new();
    for (name, own) in definition.params() {
        let converted = if let Some(raw) = captures.get(name) {
            let converter = own.as_ref().or_else(|| {
                definition
                    .pattern()
                    .placeholder(name)
                    .and_then(|p| p.ty.as_ref())
                    .map(parameter::ParameterType::converter)
            });
            convert(converter, raw)
        } else if let Some(arg) =
            argument.filter(|a| a.slot() == name.as_str())
        {
            convert_argument(own.as_ref(), arg)
        } else {
            _ = dependency_names.insert(name.clone());
            continue;
        };

        match converted {
            Ok(value) => {
                _ = call_arguments.insert(name.clone(), value);
            }
            Err(e) => errors.push(BindingError::Conversion {
                step: text.to_owned(),
                name: name.clone(),
                message: format!("{e:#}"),
            }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BoundStep {
        text: text.to_owned(),
        definition: Arc::clone(definition),
        call_arguments,
        dependency_names,
    })
}

/// Converts a raw string with the given [`Converter`], or into a
/// [`Value::Str`] if there is none.
fn convert(converter: Option<&Converter>, raw: &str) -> anyhow::Result<Value> {
    converter.map_or_else(|| parameter::string(raw), |c| c(raw))
}

/// Converts a structured [`Argument`], applying the `converter` to every
/// table cell or text line.
fn convert_argument(
    converter: Option<&Converter>,
    argument: &Argument,
) -> anyhow::Result<Value> {
    match argument {
        Argument::DataTable(table) => {
            table.to_value(|cell| convert(converter, cell))
        }
        Argument::MultiLineText(lines) => lines
            .iter()
            .map(|line| convert(converter, line))
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Value::List),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        argument::{DATA_TABLE, MULTI_LINE},
        step::{parameter::converter, Step},
    };

    fn def(step: Step) -> Arc<StepDefinition> {
        Arc::new(step.compile().unwrap())
    }

    fn noop(template: &str) -> Step {
        Step::new(template, |_| Ok(()))
    }

    #[test]
    fn classifies_parameters() {
        let definition = def(noop("I have {a:d} and {b}")
            .fixture("context")
            .param("a")
            .param("b"));
        let bound =
            bind(&StepText::new("I have 3 and four"), &definition).unwrap();

        assert_eq!(bound.call_arguments()["a"], Value::Int(3));
        assert_eq!(bound.call_arguments()["b"], Value::from("four"));
        assert_eq!(
            bound.dependency_names().iter().collect::<Vec<_>>(),
            ["context"],
        );
        assert_eq!(bound.text(), "I have 3 and four");
    }

    #[test]
    fn own_converter_overrides_placeholder_type() {
        let definition = def(noop("I have {a:d}").param_with(
            "a",
            converter(|s| Ok(Value::from(format!("<{s}>")))),
        ));
        let bound = bind(&StepText::new("I have 3"), &definition).unwrap();
        assert_eq!(bound.call_arguments()["a"], Value::from("<3>"));
    }

    #[test]
    fn undeclared_capture() {
        let definition = def(noop("I have {a}"));
        let errs = bind(&StepText::new("I have 3"), &definition).unwrap_err();
        assert_eq!(
            errs,
            [BindingError::UndeclaredCapture {
                step: "I have 3".into(),
                name: "a".into(),
            }],
        );
    }

    #[test]
    fn reserved_capture() {
        let definition = def(noop("I see {data_table}").data_table());
        let step =
            StepText::new("I see x").with_argument(Argument::table([["1"]]));
        let errs = bind(&step, &definition).unwrap_err();
        assert_eq!(
            errs,
            [BindingError::ReservedCapture {
                step: "I see x".into(),
                name: DATA_TABLE.into(),
            }],
        );
    }

    #[test]
    fn argument_without_parameter() {
        let definition = def(noop("I see"));
        let step =
            StepText::new("I see").with_argument(Argument::multi_line("x"));
        let errs = bind(&step, &definition).unwrap_err();
        assert_eq!(
            errs,
            [BindingError::UnexpectedArgument {
                step: "I see".into(),
                slot: MULTI_LINE,
            }],
        );
    }

    #[test]
    fn slot_parameter_without_argument() {
        let definition = def(noop("I have a matrix:").data_table());
        let errs = bind(&StepText::new("I have a matrix:"), &definition)
            .unwrap_err();
        assert_eq!(
            errs[0].to_string(),
            "For step I have a matrix: data_table parameter found, but not the \
             data_table",
        );
    }

    #[test]
    fn wrong_slot_reports_both_sides() {
        let definition = def(noop("I see").data_table());
        let step =
            StepText::new("I see").with_argument(Argument::multi_line("x"));
        let errs = bind(&step, &definition).unwrap_err();
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn conversion_failure_is_tagged() {
        let definition = def(noop("I pick {n}")
            .param_with("n", converter(parameter::integer)));
        let errs =
            bind(&StepText::new("I pick many"), &definition).unwrap_err();
        let BindingError::Conversion { step, name, message } = &errs[0] else {
            panic!("unexpected error: {errs:?}");
        };
        assert_eq!(step, "I pick many");
        assert_eq!(name, "n");
        assert!(message.contains("not an integer"), "{message}");
    }

    #[test]
    fn table_cells_are_converted() {
        let definition = def(noop("I have a matrix:")
            .param_with(DATA_TABLE, converter(parameter::integer)));
        let step = StepText::new("I have a matrix:")
            .with_argument(Argument::table([["1", "2"], ["3", "4"]]));
        let bound = bind(&step, &definition).unwrap();
        assert_eq!(
            bound.call_arguments()[DATA_TABLE],
            Value::from(vec![
                vec![Value::Int(1), Value::Int(2)],
                vec![Value::Int(3), Value::Int(4)],
            ]),
        );
        assert!(bound.dependency_names().is_empty());
    }

    #[test]
    fn lines_default_to_strings() {
        let definition = def(noop("I read").multi_line());
        let step =
            StepText::new("I read").with_argument(Argument::multi_line("a\nb"));
        let bound = bind(&step, &definition).unwrap();
        assert_eq!(
            bound.call_arguments()[MULTI_LINE],
            Value::from(vec!["a", "b"]),
        );
    }

    #[test]
    fn invoke_passes_declared_fixtures_only() {
        use crate::fixture::{Fixture, RunContext, CONTEXT};

        let definition = def(Step::new("I store {v}", |call| {
            let v = call.str("v")?.to_owned();
            _ = call.context()?.insert("v".into(), v.into());
            assert!(call.fixture::<u8>("other").is_err());
            Ok(())
        })
        .param("v")
        .fixture(CONTEXT));
        let bound = bind(&StepText::new("I store x"), &definition).unwrap();

        let context = Fixture::new(RunContext::default());
        let mut resolved = Resolved::new();
        _ = resolved.insert(CONTEXT.into(), context.clone());
        _ = resolved.insert("other".into(), Fixture::new(1_u8));

        bound.invoke(&resolved).unwrap();
        assert_eq!(
            context.borrow_mut::<RunContext>().unwrap().get("v"),
            Some(&Value::from("x")),
        );
        assert!(bound.invoke(&Resolved::new()).is_err());
    }
}
