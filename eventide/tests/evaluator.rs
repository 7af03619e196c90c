mod helpers;

use std::sync::Arc;

use eventide::normalize::RawArray;
use eventide::{
    BackendKey, DType, Evaluator, EventideError, FeatureSchema, Graph, ImplementationRegistry,
    InputPolicy, MapFunction, OperatorTag, Schema, Value, evaluate, event_set,
};
use eventide_mock::MockBehavior;
use eventide_mock::fixtures::{market, series};

use helpers::{mocked, mocked_with};

fn bump() -> MapFunction {
    MapFunction::value(|v| Ok(Value::Float64(v.as_f64().unwrap_or(f64::NAN) + 1.0)))
}

/// `x -> map -> {add(map, map), lag(map)}` over the `series::source` schema.
fn diamond() -> Graph {
    let mut g = Graph::new();
    let x = g.input("x", series::source().schema().clone()).unwrap();
    let bumped = g.map(&x, bump()).unwrap();
    let sum = g.add(&bumped, &bumped).unwrap();
    let lagged = g.lag(&bumped, 1.0).unwrap();
    g.output("bumped", &bumped).unwrap();
    g.output("sum", &sum).unwrap();
    g.output("lagged", &lagged).unwrap();
    g
}

#[test]
fn shared_upstream_node_runs_once() {
    let (ev, ctl) = mocked();
    let out = ev
        .evaluate(&diamond(), [("x", series::source())], &["sum", "lagged", "bumped"])
        .unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(ctl.calls(OperatorTag::Map), 1);
    assert_eq!(ctl.calls(OperatorTag::Arithmetic), 1);
    assert_eq!(ctl.calls(OperatorTag::Lag), 1);
    assert_eq!(ctl.total_calls(), 3);
}

#[test]
fn only_reachable_nodes_run() {
    let (ev, ctl) = mocked();
    ev.evaluate(&diamond(), [("x", series::source())], &["lagged"])
        .unwrap();
    assert_eq!(ctl.calls(OperatorTag::Arithmetic), 0);
    let log: Vec<_> = ctl.log().into_iter().map(|(tag, _)| tag).collect();
    assert_eq!(log, [OperatorTag::Map, OperatorTag::Lag]);
}

#[test]
fn repeated_evaluation_is_deterministic() {
    let g = diamond();
    let x = Arc::new(series::source());
    let a = evaluate(&g, [("x", Arc::clone(&x))], &["sum", "lagged"]).unwrap();
    let b = evaluate(&g, [("x", Arc::clone(&x))], &["sum", "lagged"]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a["sum"].schema(), g.schema(&g.outputs()["sum"]).unwrap().as_ref());
}

#[test]
fn required_inputs_are_exactly_the_reached_ones() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let t = g.input("trades", market::trades().schema().clone()).unwrap();
    let sampled = g.sample(&c, &t).unwrap();
    let lagged = g.lag(&c, 5.0).unwrap();
    g.output("sampled", &sampled).unwrap();
    g.output("lagged", &lagged).unwrap();

    // `trades` is not reached from `lagged`.
    evaluate(&g, [("closes", closes.clone())], &["lagged"]).unwrap();

    let err = evaluate(&g, [("closes", closes)], &["sampled"]).unwrap_err();
    assert_eq!(err, EventideError::MissingInput { name: "trades".into() });
}

#[test]
fn unused_inputs_follow_the_input_policy() {
    let g = diamond();
    let inputs = || [("x", series::source()), ("unused", series::queries())];

    evaluate(&g, inputs(), &["bumped"]).unwrap();

    let strict = Evaluator::builder()
        .input_policy(InputPolicy::Strict)
        .build()
        .unwrap();
    let err = strict.evaluate(&g, inputs(), &["bumped"]).unwrap_err();
    assert_eq!(err, EventideError::ExtraInput { name: "unused".into() });
}

#[test]
fn unknown_output_is_reported() {
    let err = evaluate(&diamond(), [("x", series::source())], &["nope"]).unwrap_err();
    assert_eq!(err, EventideError::UnknownOutput { name: "nope".into() });
}

#[test]
fn input_with_another_schema_is_rejected() {
    let err = evaluate(&diamond(), [("x", series::queries())], &["bumped"]).unwrap_err();
    assert!(matches!(err, EventideError::SchemaMismatch(_)), "{err:?}");
}

#[test]
fn implementation_failures_abort_and_name_the_node() {
    let (ev, ctl) = mocked();
    let mut g = diamond();
    let lag_id = g.outputs()["lagged"].node;
    g.set_name(lag_id, "shifted").unwrap();

    ctl.set_behavior(OperatorTag::Lag, MockBehavior::Fail(EventideError::InvalidArg("boom".into())));
    let err = ev
        .evaluate(&g, [("x", series::source())], &["sum", "lagged"])
        .unwrap_err();
    match err {
        EventideError::Implementation { node, operator, msg } => {
            assert_eq!(node, "shifted");
            assert_eq!(operator, "lag");
            assert!(msg.contains("boom"));
        }
        other => panic!("expected Implementation, got {other:?}"),
    }

    // Typed errors raised by an implementation keep their kind.
    ctl.set_behavior(OperatorTag::Lag, MockBehavior::Fail(EventideError::Function("f".into())));
    let err = ev.evaluate(&g, [("x", series::source())], &["lagged"]).unwrap_err();
    assert_eq!(err, EventideError::Function("f".into()));
}

#[test]
fn produced_schema_is_checked_against_the_declared_one() {
    let wrong = series::floats("other", &[0.0, 10.0, 20.0], &[1.0, 2.0, 3.0]);

    let (ev, ctl) = mocked();
    ctl.set_behavior(OperatorTag::Map, MockBehavior::Return(wrong.clone()));
    let err = ev
        .evaluate(&diamond(), [("x", series::source())], &["bumped"])
        .unwrap_err();
    assert!(matches!(err, EventideError::SchemaMismatch(_)), "{err:?}");

    let (lax, ctl) = mocked_with(|b| b.verify_output_schemas(false));
    ctl.set_behavior(OperatorTag::Map, MockBehavior::Return(wrong.clone()));
    let out = lax
        .evaluate(&diamond(), [("x", series::source())], &["bumped"])
        .unwrap();
    assert_eq!(out["bumped"].as_ref(), &wrong);
}

#[test]
fn sampling_checks_catch_misaligned_outputs() {
    let shifted = event_set(
        RawArray::from(vec![1.0, 11.0, 21.0]),
        [("x", RawArray::from(vec![1i32, 2, 3]))],
        &[],
        None,
    )
    .unwrap();

    let (ev, ctl) = mocked();
    ctl.set_behavior(OperatorTag::Map, MockBehavior::Return(shifted.clone()));
    ev.evaluate(&diamond(), [("x", series::source())], &["bumped"])
        .unwrap();

    let (checked, ctl) = mocked_with(|b| b.verify_sampling(true));
    ctl.set_behavior(OperatorTag::Map, MockBehavior::Return(shifted));
    let err = checked
        .evaluate(&diamond(), [("x", series::source())], &["bumped"])
        .unwrap_err();
    assert!(matches!(err, EventideError::SchemaMismatch(_)), "{err:?}");
}

#[test]
fn backend_without_implementations_is_rejected_up_front() {
    let err = Evaluator::builder()
        .backend(BackendKey::new("accelerated"))
        .build()
        .unwrap_err();
    assert!(matches!(err, EventideError::InvalidArg(_)));
}

#[test]
fn missing_operator_in_backend_is_unregistered() {
    let registry = ImplementationRegistry::new();
    eventide::reference::map::register(&registry).unwrap();
    let ev = Evaluator::builder()
        .registry(Arc::new(registry))
        .build()
        .unwrap();

    let x = series::source();
    let schema = Schema::unindexed(vec![FeatureSchema::new("x", DType::Int32)]).unwrap();
    let mut g = Graph::new();
    let p = g.input("x", schema).unwrap();
    let m = g.map(&p, bump()).unwrap();
    let l = g.lag(&m, 1.0).unwrap();
    g.output("m", &m).unwrap();
    g.output("l", &l).unwrap();

    assert!(ev.evaluate(&g, [("x", x.clone())], &["m"]).is_ok());
    let err = ev.evaluate(&g, [("x", x)], &["l"]).unwrap_err();
    assert!(
        matches!(err, EventideError::UnregisteredOperator { ref operator, .. } if operator == "lag"),
        "{err:?}"
    );
}

#[test]
fn default_registry_holds_every_reference_operator() {
    let fresh = ImplementationRegistry::new();
    assert!(eventide::reference::register_all(&fresh).is_ok());

    let registry = eventide::registry();
    assert!(Arc::ptr_eq(&registry, &eventide::registry()));
    for tag in OperatorTag::ALL.into_iter().filter(|t| t.is_dispatched()) {
        assert!(registry.contains(BackendKey::REFERENCE, tag), "{tag} missing");
    }
    assert!(matches!(
        eventide::reference::register_all(&registry),
        Err(EventideError::DuplicateRegistration { .. })
    ));
}
