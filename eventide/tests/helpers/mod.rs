// Shared by several test binaries; not every binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use eventide::{Column, Evaluator, EventSet, ImplementationRegistry, IndexItem, IndexKey};
use eventide_mock::{MOCK_BACKEND, MockController};

/// Evaluator over a mock backend that delegates to the reference one.
pub fn mocked() -> (Evaluator, MockController) {
    mocked_with(|b| b)
}

/// Like [`mocked`], with extra builder settings.
pub fn mocked_with(
    configure: impl FnOnce(eventide::EvaluatorBuilder) -> eventide::EvaluatorBuilder,
) -> (Evaluator, MockController) {
    let registry = ImplementationRegistry::new();
    let controller = eventide_mock::instrument(
        eventide::registry(),
        eventide::BackendKey::REFERENCE,
        &registry,
        MOCK_BACKEND,
    )
    .expect("fresh registry");
    let builder = Evaluator::builder()
        .registry(Arc::new(registry))
        .backend(MOCK_BACKEND);
    let evaluator = configure(builder).build().expect("mock backend is populated");
    (evaluator, controller)
}

/// The key of an unindexed event set.
pub const fn unindexed() -> IndexKey {
    IndexKey::empty()
}

/// Single-item string key.
pub fn key(s: &str) -> IndexKey {
    IndexKey::new(vec![IndexItem::from(s)])
}

/// Values of a `FLOAT64` column.
pub fn f64s(c: &Column) -> &[f64] {
    match c {
        Column::Float64(v) => v,
        other => panic!("expected a FLOAT64 column, got {:?}", other.dtype()),
    }
}

/// Values of an `INT32` column.
pub fn i32s(c: &Column) -> &[i32] {
    match c {
        Column::Int32(v) => v,
        other => panic!("expected an INT32 column, got {:?}", other.dtype()),
    }
}

/// Values of an `INT64` column.
pub fn i64s(c: &Column) -> &[i64] {
    match c {
        Column::Int64(v) => v,
        other => panic!("expected an INT64 column, got {:?}", other.dtype()),
    }
}

/// Timestamps of one key.
pub fn timestamps<'a>(es: &'a EventSet, key: &IndexKey) -> &'a [f64] {
    es.get(key).expect("key present").timestamps()
}

/// Compare float slices, treating NaN as equal to NaN.
pub fn assert_floats_eq(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len(), "length differs: {got:?} vs {want:?}");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!(
            (g.is_nan() && w.is_nan()) || (g - w).abs() < 1e-9,
            "index {i}: got {g}, want {w} ({got:?} vs {want:?})"
        );
    }
}
