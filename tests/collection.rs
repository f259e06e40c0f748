use std::fs;

use cucumber_engine::{
    cli::{self, Parser as _},
    feature,
    proposal::PROPOSAL_FILE,
    runner,
    step::parameter,
    Engine, Runner, Scenario, Step,
};

fn must_not_run(template: &str) -> Step {
    Step::new(template, |call| panic!("`{}` must not run", call.step()))
}

fn engine() -> Engine {
    let mut engine = Engine::new();
    for step in [
        must_not_run("I have {n} wings")
            .param_with("n", parameter::converter(parameter::integer)),
        must_not_run("I have a matrix:").data_table(),
        must_not_run("I read:"),
    ] {
        engine.register_step(step).unwrap();
    }
    engine
}

#[test]
fn missing_steps_are_proposed_once() {
    let dir = tempfile::tempdir().unwrap();
    let opts = cli::Opts::try_parse_from([
        "collection",
        "--proposal-dir",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = Runner::new(engine())
        .with_cli(opts)
        .run("tests/features/collection/missing.feature")
        .unwrap_err();
    let runner::Error::Collection(err) = &err else {
        panic!("expected collection error, got: {err}");
    };

    assert!(err.report.errors.is_empty(), "{:?}", err.report.errors);
    assert_eq!(
        err.report.missing_steps,
        ["I fly to the moon", r#"I land on "Mars""#],
    );

    let path = err.proposal.clone().unwrap();
    assert_eq!(path, dir.path().join(PROPOSAL_FILE));
    let proposal = fs::read_to_string(path).unwrap();
    assert_eq!(proposal.matches("pub fn i_fly_to_the_moon()").count(), 1);
    assert!(proposal.contains("pub fn i_land_on__mars_()"), "{proposal}");
}

#[test]
fn binding_errors_are_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine().with_proposal_dir(Some(dir.path().to_owned()));

    let scenarios =
        feature::load("tests/features/collection/binding.feature").unwrap();
    let err = engine.collect(scenarios).unwrap_err();

    assert!(err.report.missing_steps.is_empty());
    assert!(err.proposal.is_none());
    assert_eq!(err.report.errors.len(), 3, "{:?}", err.report.errors);

    let report = err.to_string();
    assert!(report.starts_with("Errors found during collection:"), "{report}");
    assert!(report.contains("I have many wings"), "{report}");
    assert!(report.contains("data_table parameter found"), "{report}");
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn ambiguous_steps_fail_whole_collection() {
    let mut engine = engine().without_proposal();
    engine
        .register_step(must_not_run("I have {count:d} wings").param("count"))
        .unwrap();
    assert_eq!(engine.report().errors.len(), 1);

    let scenarios = feature::load("tests/features/collection").unwrap();
    assert_eq!(scenarios.len(), 3);

    let err = engine.collect(scenarios).unwrap_err();
    assert!(err.report.errors[0].starts_with("Similar step name"));
    assert_eq!(err.report.missing_steps.len(), 2);
}

#[test]
fn reset_starts_from_scratch() {
    let mut engine = engine().without_proposal();
    let scenarios =
        feature::load("tests/features/collection/missing.feature").unwrap();
    assert!(engine.collect(scenarios).is_err());
    assert!(!engine.diagnostics().is_empty());

    engine.reset();
    assert!(engine.diagnostics().is_empty());
    assert!(engine.collect(Vec::<Scenario>::new()).unwrap().is_empty());
}
