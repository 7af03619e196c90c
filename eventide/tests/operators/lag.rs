use eventide::{EventideError, Graph, evaluate};
use eventide_mock::fixtures::market;

use crate::helpers::{key, timestamps};

#[test]
fn lag_shifts_timestamps_and_keeps_values() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let later = g.lag(&c, 3_600.0).unwrap();
    let earlier = g.lag(&c, -60.0).unwrap();
    g.output("later", &later).unwrap();
    g.output("earlier", &earlier).unwrap();

    let out = evaluate(&g, [("closes", closes.clone())], &["later", "earlier"]).unwrap();
    for k in [key("AAPL"), key("MSFT")] {
        let base = timestamps(&closes, &k);
        let shifted: Vec<f64> = base.iter().map(|t| t + 3_600.0).collect();
        assert_eq!(timestamps(&out["later"], &k), shifted.as_slice());
        let back: Vec<f64> = base.iter().map(|t| t - 60.0).collect();
        assert_eq!(timestamps(&out["earlier"], &k), back.as_slice());
        assert_eq!(out["later"].column(&k, "close").unwrap(), closes.column(&k, "close").unwrap());
    }
    assert!(!out["later"].same_sampling_as(&closes));
}

#[test]
fn lagged_output_has_a_new_sampling() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let later = g.lag(&c, 1.0).unwrap();
    assert!(matches!(g.add(&c, &later), Err(EventideError::SchemaMismatch(_))));
    assert!(matches!(g.lag(&c, f64::INFINITY), Err(EventideError::InvalidArg(_))));
}
