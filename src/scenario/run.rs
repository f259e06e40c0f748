// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle of a single [`Scenario`] execution.
//!
//! ```text
//! New --verify--> Verified --setup--> Ready --run--> Running --> Done
//!  |                 |                  |               |
//!  +-----------------+------------------+---------------+--> Failed
//! ```

use std::{
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    binder::{self, BoundStep},
    diagnostics::Diagnostics,
    error::{PanicPayloadExt as _, ScenarioError},
    fixture::{FixtureProvider, Resolved},
    hooks::Hooks,
    step::Collection,
};

use super::Scenario;

/// State of a [`ScenarioRun`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Nothing checked yet.
    New,

    /// Every step is bound.
    Verified,

    /// Fixtures are resolved.
    Ready,

    /// Steps are executing.
    Running,

    /// All the steps passed.
    Done,

    /// Terminal failure.
    Failed,
}

/// Execution of one [`Scenario`]: its bound steps, required fixtures and
/// tag metadata.
#[derive(Debug)]
pub struct ScenarioRun {
    /// Executed scenario.
    scenario: Scenario,

    /// Current [`State`].
    state: State,

    /// Outcome of the first [`ScenarioRun::verify()`] call.
    verification: Option<Result<(), ScenarioError>>,

    /// Tags applied as plain markers.
    markers: Vec<String>,

    /// Key/value properties recorded by tag handlers.
    properties: Vec<(String, String)>,

    /// Bound steps, in document order.
    steps: Vec<BoundStep>,

    /// Union of the fixtures every step depends on.
    required: BTreeSet<String>,
}

impl ScenarioRun {
    /// Creates a new [`ScenarioRun`] in the [`State::New`].
    #[must_use]
    pub const fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            state: State::New,
            verification: None,
            markers: Vec::new(),
            properties: Vec::new(),
            steps: Vec::new(),
            required: BTreeSet::new(),
        }
    }

    /// Returns the executed [`Scenario`].
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Returns the name of the executed [`Scenario`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.scenario.name
    }

    /// Returns the current [`State`].
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Attaches a generic marker.
    pub fn add_marker(&mut self, marker: impl Into<String>) {
        self.markers.push(marker.into());
    }

    /// Returns the attached markers.
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Records a key/value user property.
    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.properties.push((key.into(), value.into()));
    }

    /// Returns the recorded user properties.
    #[must_use]
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Returns the steps bound so far.
    #[must_use]
    pub fn steps(&self) -> &[BoundStep] {
        &self.steps
    }

    /// Returns the names of the fixtures required by all the steps.
    #[must_use]
    pub const fn required_dependencies(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Looks up and binds every step, recording missing steps and binding
    /// errors into the `diagnostics`.
    ///
    /// Only the first call does any work: later ones return the same outcome
    /// without touching the `diagnostics` again.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::Unbound`] if any step is missing or failed to bind.
    pub fn verify(
        &mut self,
        steps: &Collection,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ScenarioError> {
        if let Some(outcome) = &self.verification {
            return outcome.clone();
        }
        if self.state != State::New {
            return Err(self.invalid_state("verify"));
        }

        tracing::debug!(scenario = self.name(), "verifying scenario");

        let (mut missing, mut errors) = (0, 0);
        for step in &self.scenario.steps {
            let Some(definition) = steps.find(&step.text) else {
                missing += 1;
                diagnostics.add_missing_step(&step.text);
                continue;
            };
            match binder::bind(step, definition) {
                Ok(bound) => {
                    self.required
                        .extend(bound.dependency_names().iter().cloned());
                    self.steps.push(bound);
                }
                Err(errs) => {
                    errors += errs.len();
                    for e in errs {
                        diagnostics.add_error(e);
                    }
                }
            }
        }

        let outcome = if missing + errors == 0 {
            self.state = State::Verified;
            Ok(())
        } else {
            self.state = State::Failed;
            Err(ScenarioError::Unbound {
                scenario: self.scenario.name.clone(),
                missing,
                errors,
            })
        };
        tracing::debug!(
            scenario = self.name(),
            required = ?self.required,
            ok = outcome.is_ok(),
            "scenario verified",
        );
        self.verification = Some(outcome.clone());
        outcome
    }

    /// Resolves every required fixture through the `provider`.
    ///
    /// # Errors
    ///
    /// - [`ScenarioError::InvalidState`] if not [`State::Verified`];
    /// - [`ScenarioError::DependencyResolution`] on the first unresolvable
    ///   fixture, failing this scenario only.
    pub fn setup(
        &mut self,
        provider: &dyn FixtureProvider,
    ) -> Result<Resolved, ScenarioError> {
        if self.state != State::Verified {
            return Err(self.invalid_state("set up"));
        }

        let mut resolved = Resolved::new();
        for name in &self.required {
            let Some(fixture) = provider.resolve(name) else {
                self.state = State::Failed;
                return Err(ScenarioError::DependencyResolution {
                    scenario: self.scenario.name.clone(),
                    name: name.clone(),
                });
            };
            _ = resolved.insert(name.clone(), fixture);
        }

        self.state = State::Ready;
        Ok(resolved)
    }

    /// Invokes every bound step in document order, stopping at the first
    /// failing one.
    ///
    /// May be called either after [`ScenarioRun::setup()`], or right after
    /// verification with fixtures resolved by the caller.
    ///
    /// # Errors
    ///
    /// - [`ScenarioError::InvalidState`] if neither [`State::Verified`] nor
    ///   [`State::Ready`];
    /// - [`ScenarioError::DependencyResolution`] if a required fixture isn't
    ///   among the `resolved` ones;
    /// - [`ScenarioError::StepExecution`] if a handler returns an error or
    ///   panics.
    pub fn run(
        &mut self,
        resolved: &Resolved,
        hooks: &Hooks,
    ) -> Result<(), ScenarioError> {
        if !matches!(self.state, State::Verified | State::Ready) {
            return Err(self.invalid_state("run"));
        }
        let unresolved =
            self.required.iter().find(|n| !resolved.contains_key(*n));
        if let Some(name) = unresolved {
            let name = name.clone();
            self.state = State::Failed;
            return Err(ScenarioError::DependencyResolution {
                scenario: self.scenario.name.clone(),
                name,
            });
        }

        self.state = State::Running;
        if let Some(hook) = &hooks.before_scenario {
            hook(self);
        }

        let mut failure = None;
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(hook) = &hooks.before_step {
                hook(self, step);
            }
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| step.invoke(resolved)));
            let message = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("{e:#}")),
                Err(payload) => Some(payload.to_readable_string()),
            };
            if let Some(message) = message {
                failure = Some(ScenarioError::StepExecution {
                    scenario: self.scenario.name.clone(),
                    step: step.text().to_owned(),
                    index,
                    message,
                });
                break;
            }
            if let Some(hook) = &hooks.after_step {
                hook(self, step);
            }
        }

        if let Some(hook) = &hooks.after_scenario {
            hook(self);
        }

        match failure {
            None => {
                self.state = State::Done;
                Ok(())
            }
            Some(e) => {
                tracing::error!("{e}");
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn invalid_state(&self, operation: &'static str) -> ScenarioError {
        ScenarioError::InvalidState {
            scenario: self.scenario.name.clone(),
            operation,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        fixture::{Fixture, Fixtures, RunContext, CONTEXT},
        step::Step,
        Value,
    };

    fn calc() -> Collection {
        let mut steps = Collection::new();
        for step in [
            Step::new("I have {a:d} and {b:d}", |call| {
                let nums = vec![
                    Value::Int(call.int("a")?),
                    Value::Int(call.int("b")?),
                ];
                _ = call.context()?.insert("nums".into(), Value::List(nums));
                Ok(())
            })
            .param("a")
            .param("b")
            .fixture(CONTEXT),
            Step::new("I add them", |call| {
                let mut ctx = call.context()?;
                let sum = ctx["nums"]
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_int)
                    .sum::<i64>();
                _ = ctx.insert("ans".into(), Value::Int(sum));
                Ok(())
            })
            .fixture(CONTEXT),
            Step::new("I have {ans:d} as result", |call| {
                let expected = call.int("ans")?;
                assert_eq!(call.context()?["ans"], Value::Int(expected));
                Ok(())
            })
            .param("ans")
            .fixture(CONTEXT),
            Step::new("it explodes", |_| anyhow::bail!("boom")),
        ] {
            assert!(steps.add(step.compile().unwrap()).is_empty());
        }
        steps
    }

    fn adding(result: i64) -> Scenario {
        Scenario::new("Adding")
            .step("I have 3 and 4")
            .step("I add them")
            .step(format!("I have {result} as result"))
    }

    #[test]
    fn full_lifecycle() {
        let steps = calc();
        let mut diag = Diagnostics::new();
        let mut run = ScenarioRun::new(adding(7));
        assert_eq!(run.state(), State::New);

        run.verify(&steps, &mut diag).unwrap();
        assert_eq!(run.state(), State::Verified);
        assert!(diag.is_empty());
        assert_eq!(
            run.required_dependencies().iter().collect::<Vec<_>>(),
            [CONTEXT],
        );

        let resolved = run.setup(&Fixtures::default()).unwrap();
        assert_eq!(run.state(), State::Ready);

        run.run(&resolved, &Hooks::default()).unwrap();
        assert_eq!(run.state(), State::Done);

        let ctx = resolved[CONTEXT].borrow_mut::<RunContext>().unwrap();
        assert_eq!(ctx["ans"], Value::Int(7));
    }

    #[test]
    fn verify_is_idempotent() {
        let steps = calc();
        let mut diag = Diagnostics::new();
        let mut run = ScenarioRun::new(adding(7).step("I fly"));

        assert!(run.verify(&steps, &mut diag).is_err());
        let required = run.required_dependencies().clone();
        let report = diag.report();

        let again = run.verify(&steps, &mut diag).unwrap_err();
        assert_eq!(
            again,
            ScenarioError::Unbound {
                scenario: "Adding".into(),
                missing: 1,
                errors: 0,
            },
        );
        assert_eq!(run.required_dependencies(), &required);
        assert_eq!(diag.report(), report);
        assert_eq!(run.state(), State::Failed);
    }

    #[test]
    fn unbound_scenario_cannot_run() {
        let steps = calc();
        let mut diag = Diagnostics::new();
        let mut run = ScenarioRun::new(Scenario::new("Flying").step("I fly"));
        assert!(run.verify(&steps, &mut diag).is_err());
        assert_eq!(diag.missing_steps(), ["I fly"]);

        let err = run.run(&Resolved::new(), &Hooks::default()).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::InvalidState { state: State::Failed, .. },
        ));
        assert!(run.setup(&Fixtures::default()).is_err());
    }

    #[test]
    fn unresolvable_fixture_fails_setup() {
        let steps = calc();
        let mut run = ScenarioRun::new(adding(7));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();

        let err = run.setup(&Fixtures::empty()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Fixture not found: context (scenario `Adding`)",
        );
        assert_eq!(run.state(), State::Failed);
    }

    #[test]
    fn run_from_verified_checks_resolved() {
        let steps = calc();
        let mut run = ScenarioRun::new(adding(7));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();

        let err = run.run(&Resolved::new(), &Hooks::default()).unwrap_err();
        assert!(matches!(err, ScenarioError::DependencyResolution { .. }));

        let mut run = ScenarioRun::new(adding(7));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();
        let mut resolved = Resolved::new();
        let context = Fixture::new(RunContext::default());
        _ = resolved.insert(CONTEXT.into(), context);
        run.run(&resolved, &Hooks::default()).unwrap();
        assert_eq!(run.state(), State::Done);
    }

    #[test]
    fn failing_step_halts_scenario() {
        let steps = calc();
        let mut run = ScenarioRun::new(adding(8).step("I add them"));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();
        let resolved = run.setup(&Fixtures::default()).unwrap();

        let executed = Arc::new(Mutex::new(Vec::new()));
        let hooks = Hooks::new().after_step({
            let executed = Arc::clone(&executed);
            move |_, step| executed.lock().unwrap().push(step.text().to_owned())
        });

        let err = run.run(&resolved, &hooks).unwrap_err();
        let ScenarioError::StepExecution { step, index, message, .. } = &err
        else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(step, "I have 8 as result");
        assert_eq!(*index, 2);
        assert!(message.contains("assertion"), "{message}");
        assert_eq!(*executed.lock().unwrap(), ["I have 3 and 4", "I add them"]);
        assert_eq!(run.state(), State::Failed);
    }

    #[test]
    fn handler_error_is_reported() {
        let steps = calc();
        let mut run =
            ScenarioRun::new(Scenario::new("Boom").step("it explodes"));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();
        assert!(run.required_dependencies().is_empty());

        let resolved = run.setup(&Fixtures::empty()).unwrap();
        let err = run.run(&resolved, &Hooks::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Step `it explodes` of scenario `Boom` failed: boom",
        );
    }

    #[test]
    fn scenario_hooks_wrap_steps() {
        let steps = calc();
        let mut run = ScenarioRun::new(adding(7));
        run.verify(&steps, &mut Diagnostics::new()).unwrap();
        let resolved = run.setup(&Fixtures::default()).unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = Hooks::new()
            .before_scenario({
                let log = Arc::clone(&log);
                move |run| {
                    let entry = format!("start {:?}", run.state());
                    log.lock().unwrap().push(entry);
                }
            })
            .before_step({
                let log = Arc::clone(&log);
                move |_, step| log.lock().unwrap().push(step.text().to_owned())
            })
            .after_scenario({
                let log = Arc::clone(&log);
                move |run| {
                    let entry = format!("end {}", run.name());
                    log.lock().unwrap().push(entry);
                }
            });

        run.run(&resolved, &hooks).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            [
                "start Running",
                "I have 3 and 4",
                "I add them",
                "I have 7 as result",
                "end Adding",
            ],
        );
    }
}
