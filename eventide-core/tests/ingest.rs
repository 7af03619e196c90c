use eventide_core::ingest::ingest;
use eventide_core::normalize::{RawArray, RawValue};
use eventide_core::timeseries::util::is_ascending;
use eventide_core::{
    Column, DType, EventideError, FeatureSchema, IndexItem, IndexKey, IndexSchema, Schema,
    event_set,
};
use proptest::prelude::*;

fn key(s: &str) -> IndexKey {
    IndexKey::from([IndexItem::text(s)])
}

#[test]
fn rows_are_grouped_by_index_and_sorted() {
    let es = event_set(
        RawArray::from(vec![3.0, 1.0, 2.0, 0.5]),
        [
            ("store", RawArray::from(vec!["a", "b", "a", "a"])),
            ("sales", RawArray::from(vec![30i64, 10, 20, 5])),
        ],
        &["store"],
        None,
    )
    .unwrap();

    let expected = Schema::new(
        vec![IndexSchema::new("store", DType::String)],
        vec![FeatureSchema::new("sales", DType::Int64)],
    )
    .unwrap();
    assert_eq!(es.schema(), &expected);

    let a = es.get(&key("a")).unwrap();
    assert_eq!(a.timestamps(), &[0.5, 2.0, 3.0]);
    assert_eq!(a.features()[0], Column::Int64(vec![5, 20, 30]));
    assert_eq!(es.get(&key("b")).unwrap().timestamps(), &[1.0]);
}

#[test]
fn ties_keep_input_order() {
    let es = event_set(
        RawArray::from(vec![2.0, 1.0, 1.0]),
        [("x", RawArray::from(vec![1i32, 2, 3]))],
        &[],
        None,
    )
    .unwrap();
    let data = es.get(&IndexKey::empty()).unwrap();
    assert_eq!(data.features()[0], Column::Int32(vec![2, 3, 1]));
}

#[test]
fn unindexed_empty_input_has_the_empty_key() {
    let es = event_set(RawArray::Float64(vec![]), Vec::<(&str, RawArray)>::new(), &[], None)
        .unwrap();
    assert_eq!(es.len(), 1);
    assert!(es.get(&IndexKey::empty()).unwrap().is_empty());
}

#[test]
fn ragged_and_unknown_columns_fail() {
    let ragged = event_set(
        RawArray::from(vec![1.0, 2.0]),
        [("x", RawArray::from(vec![1i64]))],
        &[],
        None,
    );
    assert!(matches!(ragged, Err(EventideError::SchemaMismatch(_))));

    let unknown_index = event_set(
        RawArray::from(vec![1.0]),
        [("x", RawArray::from(vec![1i64]))],
        &["store"],
        None,
    );
    assert!(matches!(unknown_index, Err(EventideError::SchemaMismatch(_))));

    let float_index = event_set(
        RawArray::from(vec![1.0]),
        [("x", RawArray::from(vec![1.5f64]))],
        &["x"],
        None,
    );
    assert!(matches!(float_index, Err(EventideError::UnsupportedType { .. })));
}

#[test]
fn same_sampling_is_verified_and_shared() {
    let base = event_set(
        RawArray::from(vec![1.0, 2.0]),
        [("x", RawArray::from(vec![1i64, 2]))],
        &[],
        None,
    )
    .unwrap();

    let twin = event_set(
        RawArray::from(vec![2.0, 1.0]),
        [("y", RawArray::from(vec![true, false]))],
        &[],
        Some(&base),
    )
    .unwrap();
    assert!(twin.same_sampling_as(&base));
    let (a, b) = (
        base.get(&IndexKey::empty()).unwrap(),
        twin.get(&IndexKey::empty()).unwrap(),
    );
    assert!(std::sync::Arc::ptr_eq(a.shared_timestamps(), b.shared_timestamps()));

    let other = event_set(
        RawArray::from(vec![1.0, 3.0]),
        [("y", RawArray::from(vec![true, false]))],
        &[],
        Some(&base),
    );
    assert!(matches!(other, Err(EventideError::SchemaMismatch(_))));
}

#[test]
fn report_collects_object_warnings() {
    let report = ingest(
        RawArray::from(vec!["2020-01-01", "2020-01-02"]),
        [("o", RawArray::Object(vec![RawValue::Int(1), RawValue::Bool(false)]))],
        &[],
        None,
    )
    .unwrap();
    assert!(report.looked_like_epoch);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        report.event_set.column(&IndexKey::empty(), "o").unwrap(),
        &Column::String(vec![b"1".to_vec(), b"False".to_vec()])
    );
}

proptest! {
    #[test]
    fn every_partition_is_ascending(
        rows in proptest::collection::vec((-1_000i64..1_000, 0i64..4, any::<i32>()), 0..80)
    ) {
        let ts: Vec<i64> = rows.iter().map(|r| r.0).collect();
        let groups: Vec<i64> = rows.iter().map(|r| r.1).collect();
        let values: Vec<i32> = rows.iter().map(|r| r.2).collect();
        let es = event_set(
            RawArray::from(ts),
            [("g", RawArray::from(groups)), ("v", RawArray::from(values))],
            &["g"],
            None,
        )
        .unwrap();
        prop_assert_eq!(es.num_events(), rows.len());
        for (_, data) in &es {
            prop_assert!(is_ascending(data.timestamps()));
            prop_assert_eq!(data.features()[0].len(), data.len());
        }
    }
}
