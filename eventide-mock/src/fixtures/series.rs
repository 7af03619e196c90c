use eventide_core::EventSet;
use eventide_core::normalize::RawArray;

/// Unindexed series at `[0, 10, 20]` with `INT32` feature `x = [1, 2, 3]`.
#[must_use]
pub fn source() -> EventSet {
    eventide_core::event_set(
        RawArray::from(vec![0.0, 10.0, 20.0]),
        [("x", RawArray::from(vec![1i32, 2, 3]))],
        &[],
        None,
    )
    .expect("source fixture is well formed")
}

/// Unindexed series at `[-5, 0, 5, 25]` with `FLOAT64` feature `tick`.
#[must_use]
pub fn queries() -> EventSet {
    eventide_core::event_set(
        RawArray::from(vec![-5.0, 0.0, 5.0, 25.0]),
        [("tick", RawArray::from(vec![0.0, 1.0, 2.0, 3.0]))],
        &[],
        None,
    )
    .expect("queries fixture is well formed")
}

/// Unindexed `FLOAT64` series with the given timestamps and values.
///
/// # Panics
/// If the lengths differ or the timestamps contain NaN.
#[must_use]
pub fn floats(name: &str, timestamps: &[f64], values: &[f64]) -> EventSet {
    eventide_core::event_set(
        RawArray::from(timestamps.to_vec()),
        [(name, RawArray::from(values.to_vec()))],
        &[],
        None,
    )
    .expect("float series is well formed")
}
