/// Sentinel stored in [`SamplingIndices::indices`] for query positions that
/// precede every source timestamp.
pub const NO_MATCH: usize = usize::MAX;

/// Result of aligning a source timestamp sequence onto a query sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingIndices {
    /// For each query position `j`, the largest source position `i` with
    /// `source[i] <= query[j]`, or [`NO_MATCH`].
    pub indices: Vec<usize>,
    /// Smallest query position whose index is not [`NO_MATCH`]; the query
    /// length if there is none.
    pub first_valid: usize,
}

impl SamplingIndices {
    /// Matched source position for query position `j`.
    #[must_use]
    pub fn get(&self, j: usize) -> Option<usize> {
        self.indices.get(j).copied().filter(|&i| i != NO_MATCH)
    }

    /// Matched source positions in query order, `None` before the first match.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Option<usize>> + '_ {
        self.indices
            .iter()
            .map(|&i| if i == NO_MATCH { None } else { Some(i) })
    }

    /// Number of query positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True for an empty query.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Last-known-value alignment of `source` onto `query`.
///
/// Both sequences must be ascending. Each query timestamp is matched to the
/// latest source timestamp at or before it; an exact tie matches. Runs in
/// `O(source.len() + query.len())` with a two-pointer merge.
///
/// Matches are non-decreasing in `j`, so unmatched positions only ever form
/// a prefix of length `first_valid`.
///
/// ```
/// use eventide_core::timeseries::sample::{build_sampling_indices, NO_MATCH};
///
/// let s = build_sampling_indices(&[0.0, 10.0, 20.0], &[-5.0, 0.0, 5.0, 25.0]);
/// assert_eq!(s.indices, vec![NO_MATCH, 0, 0, 2]);
/// assert_eq!(s.first_valid, 1);
/// ```
#[must_use]
pub fn build_sampling_indices(source: &[f64], query: &[f64]) -> SamplingIndices {
    let mut indices = Vec::with_capacity(query.len());
    let mut first_valid = None;
    // Count of source timestamps <= the current query timestamp.
    let mut seen = 0;
    for (j, &q) in query.iter().enumerate() {
        while seen < source.len() && source[seen] <= q {
            seen += 1;
        }
        if seen == 0 {
            indices.push(NO_MATCH);
        } else {
            first_valid.get_or_insert(j);
            indices.push(seen - 1);
        }
    }
    SamplingIndices {
        indices,
        first_valid: first_valid.unwrap_or(query.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs() {
        let s = build_sampling_indices(&[], &[1.0, 2.0]);
        assert_eq!(s.indices, vec![NO_MATCH, NO_MATCH]);
        assert_eq!(s.first_valid, 2);

        let s = build_sampling_indices(&[1.0], &[]);
        assert!(s.is_empty());
        assert_eq!(s.first_valid, 0);
    }

    #[test]
    fn ties_match_the_last_equal_source() {
        let s = build_sampling_indices(&[1.0, 1.0, 2.0], &[1.0, 2.0, 2.0]);
        assert_eq!(s.indices, vec![1, 2, 2]);
        assert_eq!(s.first_valid, 0);
    }
}
