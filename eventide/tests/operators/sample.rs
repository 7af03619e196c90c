use std::sync::Arc;

use eventide::normalize::RawArray;
use eventide::{EventideError, Graph, event_set, evaluate};
use eventide_mock::fixtures::{market, series};

use crate::helpers::{assert_floats_eq, f64s, i32s, i64s, key, timestamps, unindexed};

#[test]
fn last_known_value_onto_query_timestamps() {
    let src = series::source();
    let queries = Arc::new(series::queries());
    let mut g = Graph::new();
    let x = g.input("x", src.schema().clone()).unwrap();
    let q = g.input("q", queries.schema().clone()).unwrap();
    let s = g.sample(&x, &q).unwrap();
    g.output("sampled", &s).unwrap();

    let out = evaluate(&g, [("x", Arc::new(src)), ("q", Arc::clone(&queries))], &["sampled"])
        .unwrap();
    let sampled = &out["sampled"];
    let data = sampled.get(&unindexed()).unwrap();
    // -5 precedes every source event, so it gets the INT32 missing value.
    assert_eq!(i32s(&data.features()[0]), &[0, 1, 1, 3]);
    assert_eq!(data.timestamps(), &[-5.0, 0.0, 5.0, 25.0]);
    assert!(sampled.same_sampling_as(&queries));
}

#[test]
fn keys_are_aligned_independently() {
    let closes = market::closes();
    let trades = market::trades();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let t = g.input("trades", trades.schema().clone()).unwrap();
    let s = g.sample(&c, &t).unwrap();
    g.output("at_trades", &s).unwrap();

    let out = evaluate(&g, [("closes", closes), ("trades", trades.clone())], &["at_trades"])
        .unwrap();
    let sampled = &out["at_trades"];
    assert_eq!(sampled.len(), 2);
    assert!(sampled.same_sampling_as(&trades));

    let aapl = sampled.get(&key("AAPL")).unwrap();
    assert_floats_eq(f64s(&aapl.features()[0]), &[f64::NAN, 190.0, 190.0]);
    assert_eq!(i64s(&aapl.features()[1]), &[0, 1_000, 1_000]);

    let msft = sampled.get(&key("MSFT")).unwrap();
    assert_floats_eq(f64s(&msft.features()[0]), &[420.0]);
    assert_eq!(timestamps(sampled, &key("MSFT")), timestamps(&trades, &key("MSFT")));
}

#[test]
fn sampling_keys_missing_from_the_input_get_missing_values() {
    let closes = market::closes();
    let sampling = event_set(
        RawArray::from(vec![1.0e12, 1.0e12 + 1.0]),
        [("symbol", RawArray::from(vec!["GOOG", "AAPL"]))],
        &["symbol"],
        None,
    )
    .unwrap();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let s = g.input("s", sampling.schema().clone()).unwrap();
    let sampled = g.sample(&c, &s).unwrap();
    g.output("out", &sampled).unwrap();

    let out = evaluate(&g, [("closes", closes), ("s", sampling)], &["out"]).unwrap();
    let out = &out["out"];
    assert_eq!(out.len(), 2, "only the sampling's keys appear");
    let goog = out.get(&key("GOOG")).unwrap();
    assert_floats_eq(f64s(&goog.features()[0]), &[f64::NAN]);
    assert_eq!(i64s(&goog.features()[1]), &[0]);
    let aapl = out.get(&key("AAPL")).unwrap();
    assert_floats_eq(f64s(&aapl.features()[0]), &[192.0]);
}

#[test]
fn index_columns_must_match() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let q = g.input("q", series::queries().schema().clone()).unwrap();
    assert!(matches!(g.sample(&c, &q), Err(EventideError::SchemaMismatch(_))));
}
