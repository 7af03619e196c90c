use eventide::{EventideError, Graph, evaluate};
use eventide_mock::fixtures::market;

use crate::helpers::key;

#[test]
fn select_reorders_and_keeps_values() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    let picked = g.select(&c, &["volume", "close"]).unwrap();
    g.output("picked", &picked).unwrap();

    let out = evaluate(&g, [("closes", closes.clone())], &["picked"]).unwrap();
    let picked = &out["picked"];
    assert_eq!(picked.schema().feature_names().collect::<Vec<_>>(), ["volume", "close"]);
    assert!(picked.same_sampling_as(&closes));
    for k in [key("AAPL"), key("MSFT")] {
        assert_eq!(picked.column(&k, "close").unwrap(), closes.column(&k, "close").unwrap());
        assert_eq!(picked.column(&k, "volume").unwrap(), closes.column(&k, "volume").unwrap());
    }
}

#[test]
fn unknown_feature_is_a_graph_error() {
    let closes = market::closes();
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone()).unwrap();
    assert!(matches!(g.select(&c, &["open"]), Err(EventideError::SchemaMismatch(_))));
}
