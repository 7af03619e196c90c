use std::sync::Arc;

use eventide::{EventideError, Graph, MapFunction, Value, evaluate};
use eventide_mock::fixtures::series;

use crate::helpers::{f64s, i32s, unindexed};

fn plus_one(v: &Value) -> Result<Value, EventideError> {
    match v {
        Value::Int32(x) => Ok(Value::Int32(x + 1)),
        other => Err(EventideError::Function(format!("expected an int32, got {other}"))),
    }
}

#[test]
fn map_increments_int32_values() {
    let src = Arc::new(series::source());
    let mut g = Graph::new();
    let x = g.input("x", src.schema().clone()).unwrap();
    let y = g.map(&x, MapFunction::value(plus_one)).unwrap();
    g.output("y", &y).unwrap();

    let out = evaluate(&g, [("x", Arc::clone(&src))], &["y"]).unwrap();
    let y = &out["y"];
    assert_eq!(y.schema(), src.schema());
    let data = y.get(&unindexed()).unwrap();
    assert_eq!(i32s(&data.features()[0]), &[2, 3, 4]);
    assert!(Arc::ptr_eq(
        data.shared_timestamps(),
        src.get(&unindexed()).unwrap().shared_timestamps()
    ));
}

#[test]
fn results_are_coerced_to_the_feature_dtype() {
    let src = series::source();
    let mut g = Graph::new();
    let x = g.input("x", src.schema().clone()).unwrap();
    let y = g
        .map(
            &x,
            MapFunction::value(|v| Ok(Value::Float64(v.as_f64().unwrap_or(0.0) + 0.9))),
        )
        .unwrap();
    g.output("y", &y).unwrap();

    let out = evaluate(&g, [("x", src)], &["y"]).unwrap();
    // 1.9, 2.9, 3.9 truncate toward zero.
    assert_eq!(i32s(&out["y"].get(&unindexed()).unwrap().features()[0]), &[1, 2, 3]);
}

#[test]
fn string_result_for_int32_feature_is_a_coercion_error() {
    let src = series::source();
    let mut g = Graph::new();
    let x = g.input("x", src.schema().clone()).unwrap();
    let y = g.map(&x, MapFunction::value(|_| Ok(Value::string("oops")))).unwrap();
    g.output("y", &y).unwrap();

    let err = evaluate(&g, [("x", src)], &["y"]).unwrap_err();
    match err {
        EventideError::TypeCoercion { dtype, feature, .. } => {
            assert_eq!(dtype, "INT32");
            assert_eq!(feature, "x");
        }
        other => panic!("expected TypeCoercion, got {other:?}"),
    }
}

#[test]
fn function_errors_surface_unchanged() {
    let src = series::queries();
    let mut g = Graph::new();
    let q = g.input("q", src.schema().clone()).unwrap();
    let y = g.map(&q, MapFunction::value(plus_one)).unwrap();
    g.output("y", &y).unwrap();

    let err = evaluate(&g, [("q", src)], &["y"]).unwrap_err();
    assert!(matches!(err, EventideError::Function(ref m) if m.contains("expected an int32")));
}

#[test]
fn context_exposes_timestamp_and_feature_name() {
    let src = series::queries();
    let mut g = Graph::new();
    let q = g.input("q", src.schema().clone()).unwrap();
    let y = g
        .map(
            &q,
            MapFunction::with_context(|_, ctx| {
                assert_eq!(ctx.feature_name, "tick");
                assert!(ctx.index_key.is_empty());
                Ok(Value::Float64(ctx.timestamp * 2.0))
            }),
        )
        .unwrap();
    g.output("y", &y).unwrap();

    let out = evaluate(&g, [("q", src)], &["y"]).unwrap();
    assert_eq!(
        f64s(&out["y"].get(&unindexed()).unwrap().features()[0]),
        &[-10.0, 0.0, 10.0, 50.0]
    );
}
