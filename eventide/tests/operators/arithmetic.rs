use eventide::normalize::RawArray;
use eventide::{EventideError, Graph, event_set, evaluate};
use eventide_mock::fixtures::market;

use crate::helpers::{assert_floats_eq, f64s, i64s, key};

#[test]
fn features_combine_pairwise_per_key() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let close = g.select(&c, &["close"]).unwrap();
    let volume = g.select(&c, &["volume"]).unwrap();
    let doubled = g.add(&close, &close).unwrap();
    let squared = g.multiply(&volume, &volume).unwrap();
    let zero = g.subtract(&close, &close).unwrap();
    let one = g.divide(&close, &close).unwrap();
    g.output("doubled", &doubled).unwrap();
    g.output("squared", &squared).unwrap();
    g.output("zero", &zero).unwrap();
    g.output("one", &one).unwrap();

    let out = evaluate(&g, [("closes", closes)], &["doubled", "squared", "zero", "one"]).unwrap();
    let msft = key("MSFT");
    assert_eq!(
        out["doubled"].schema().feature_names().collect::<Vec<_>>(),
        ["add_close_close"]
    );
    assert_floats_eq(f64s(out["doubled"].column(&msft, "add_close_close").unwrap()), &[840.0, 842.0, 844.0]);
    assert_eq!(
        i64s(out["squared"].column(&msft, "multiply_volume_volume").unwrap()),
        &[1_000_000, 4_000_000, 9_000_000]
    );
    assert_floats_eq(f64s(out["zero"].column(&msft, "subtract_close_close").unwrap()), &[0.0; 3]);
    assert_floats_eq(f64s(out["one"].column(&msft, "divide_close_close").unwrap()), &[1.0; 3]);
}

#[test]
fn inputs_declared_to_share_a_sampling_can_be_combined() {
    let a = event_set(
        RawArray::from(vec![1.0, 2.0]),
        [("a", RawArray::from(vec![1.5, 2.5]))],
        &[],
        None,
    )
    .unwrap();
    let b = event_set(
        RawArray::from(vec![1.0, 2.0]),
        [("b", RawArray::from(vec![0.5, 0.5]))],
        &[],
        Some(&a),
    )
    .unwrap();
    let mut g = Graph::new();
    let pa = g.input("a", a.schema().clone()).unwrap();
    let pb = g.input_with_sampling("b", b.schema().clone(), &pa).unwrap();
    let diff = g.subtract(&pa, &pb).unwrap();
    g.output("diff", &diff).unwrap();

    let out = evaluate(&g, [("a", a), ("b", b)], &["diff"]).unwrap();
    let col = out["diff"].column(&eventide::IndexKey::empty(), "subtract_a_b").unwrap();
    assert_floats_eq(f64s(col), &[1.0, 2.0]);
}

#[test]
fn disagreeing_timestamps_are_rejected_at_run_time() {
    let a = event_set(RawArray::from(vec![1.0, 2.0]), [("a", RawArray::from(vec![1.0, 2.0]))], &[], None)
        .unwrap();
    let b = event_set(RawArray::from(vec![1.0, 3.0]), [("b", RawArray::from(vec![1.0, 2.0]))], &[], None)
        .unwrap();
    let mut g = Graph::new();
    let pa = g.input("a", a.schema().clone()).unwrap();
    let pb = g.input_with_sampling("b", b.schema().clone(), &pa).unwrap();
    let sum = g.add(&pa, &pb).unwrap();
    g.output("sum", &sum).unwrap();

    let err = evaluate(&g, [("a", a), ("b", b)], &["sum"]).unwrap_err();
    assert!(matches!(err, EventideError::SchemaMismatch(_)), "{err:?}");
}

#[test]
fn unrelated_samplings_are_a_graph_error() {
    let closes = market::closes();
    let trades = market::trades();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let t = g.input("trades", trades.schema().clone()).unwrap();
    let close = g.select(&c, &["close"]).unwrap();
    assert!(matches!(g.add(&close, &t), Err(EventideError::SchemaMismatch(_))));
}
