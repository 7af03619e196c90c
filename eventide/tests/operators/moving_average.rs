use eventide::{DType, EventideError, Graph, evaluate};
use eventide_mock::fixtures::{market, series};

use crate::helpers::{assert_floats_eq, f64s, key, unindexed};

const DAY: f64 = 86_400.0;

#[test]
fn trailing_window_excludes_its_left_edge() {
    let src = series::floats("v", &[0.0, 1.0, 2.0, 5.0], &[1.0, 2.0, 3.0, 4.0]);
    let mut g = Graph::new();
    let v = g.input("v", src.schema().clone()).unwrap();
    let avg = g.moving_average(&v, 2.0).unwrap();
    g.output("avg", &avg).unwrap();

    let out = evaluate(&g, [("v", src)], &["avg"]).unwrap();
    assert_floats_eq(
        f64s(&out["avg"].get(&unindexed()).unwrap().features()[0]),
        &[1.0, 1.5, 2.5, 4.0],
    );
}

#[test]
fn integer_features_average_to_float64() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let avg = g.moving_average(&c, 2.0 * DAY).unwrap();
    g.output("avg", &avg).unwrap();

    let out = evaluate(&g, [("closes", closes.clone())], &["avg"]).unwrap();
    let avg = &out["avg"];
    assert!(avg.schema().feature_dtypes().all(|d| d == DType::Float64));
    assert!(avg.same_sampling_as(&closes));
    let aapl = key("AAPL");
    assert_floats_eq(f64s(avg.column(&aapl, "volume").unwrap()), &[1_000.0, 1_500.0, 2_500.0]);
    assert_floats_eq(f64s(avg.column(&aapl, "close").unwrap()), &[190.0, 190.5, 191.5]);
}

#[test]
fn non_positive_window_is_rejected() {
    let src = series::floats("v", &[0.0], &[1.0]);
    let mut g = Graph::new();
    let v = g.input("v", src.schema().clone()).unwrap();
    for window in [0.0, -1.0, f64::NAN] {
        assert!(matches!(g.moving_average(&v, window), Err(EventideError::InvalidArg(_))));
    }
}
