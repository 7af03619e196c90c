use eventide_core::timeseries::sample::{NO_MATCH, build_sampling_indices};
use proptest::prelude::*;

fn arb_sorted(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1_000i32..1_000i32, 0..max_len).prop_map(|mut v| {
        v.sort_unstable();
        v.into_iter().map(f64::from).collect()
    })
}

#[test]
fn documented_scenario() {
    let s = build_sampling_indices(&[0.0, 10.0, 20.0], &[-5.0, 0.0, 5.0, 25.0]);
    assert_eq!(s.indices, vec![NO_MATCH, 0, 0, 2]);
    assert_eq!(s.first_valid, 1);
    assert_eq!(s.get(0), None);
    assert_eq!(s.get(3), Some(2));
}

#[test]
fn large_inputs_match_binary_search() {
    let source: Vec<f64> = (0..200_000i32).map(|i| f64::from(i) * 3.0).collect();
    let query: Vec<f64> = (0..300_000i32).map(|i| f64::from(i) * 2.0 - 7.0).collect();
    let s = build_sampling_indices(&source, &query);
    for (j, &q) in query.iter().enumerate().step_by(997) {
        let k = source.partition_point(|&x| x <= q);
        assert_eq!(s.get(j), k.checked_sub(1), "query {j}");
    }
    assert_eq!(s.first_valid, query.partition_point(|&q| q < 0.0));
}

proptest! {
    #[test]
    fn matches_are_last_known_values(source in arb_sorted(60), query in arb_sorted(60)) {
        let s = build_sampling_indices(&source, &query);
        prop_assert_eq!(s.len(), query.len());
        for (j, &q) in query.iter().enumerate() {
            match s.get(j) {
                Some(k) => {
                    prop_assert!(source[k] <= q);
                    prop_assert!(k + 1 == source.len() || q < source[k + 1]);
                }
                None => {
                    prop_assert!(source.first().is_none_or(|&first| q < first));
                    prop_assert!(j < s.first_valid);
                }
            }
        }
    }

    #[test]
    fn first_valid_is_minimal(source in arb_sorted(40), query in arb_sorted(40)) {
        let s = build_sampling_indices(&source, &query);
        let expected = s.indices.iter().position(|&i| i != NO_MATCH).unwrap_or(query.len());
        prop_assert_eq!(s.first_valid, expected);
        // Matches never go backwards.
        let valid: Vec<usize> = s.positions().flatten().collect();
        prop_assert!(valid.windows(2).all(|w| w[0] <= w[1]));
    }
}
