//! Shared helpers for timestamp sequence invariants.

use crate::EventideError;

/// True if `ts` is ascending (ties allowed) and contains no NaN.
#[must_use]
pub fn is_ascending(ts: &[f64]) -> bool {
    ts.iter().all(|t| !t.is_nan()) && ts.windows(2).all(|w| w[0] <= w[1])
}

/// Ensure `ts` is ascending and NaN-free.
///
/// # Errors
/// Returns `Err(EventideError::SchemaMismatch)` naming the first offending position.
pub fn ensure_ascending(ts: &[f64]) -> Result<(), EventideError> {
    if let Some(i) = ts.iter().position(|t| t.is_nan()) {
        return Err(EventideError::schema_mismatch(format!(
            "timestamp {i} is NaN"
        )));
    }
    if let Some(i) = ts.windows(2).position(|w| w[0] > w[1]) {
        return Err(EventideError::schema_mismatch(format!(
            "timestamps are not ascending at position {}: {} > {}",
            i + 1,
            ts[i],
            ts[i + 1]
        )));
    }
    Ok(())
}

/// Stable permutation that sorts `ts` ascending.
///
/// Uses `f64::total_cmp`, so callers must reject NaN beforehand.
#[must_use]
pub fn sort_permutation(ts: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ts.len()).collect();
    order.sort_by(|&a, &b| ts[a].total_cmp(&ts[b]));
    order
}
