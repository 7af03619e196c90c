use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::{Column, EventSet, IndexData, IndexItem, IndexKey};
use crate::normalize::{RawArray, normalize_feature_values, normalize_timestamps};
use crate::timeseries::util::sort_permutation;
use crate::{EventideError, FeatureSchema, IndexSchema, Schema};

/// An ingested event set and the non-fatal issues met while normalizing it.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// The ingested data.
    pub event_set: EventSet,
    /// Normalization warnings, one per affected feature.
    pub warnings: Vec<String>,
    /// Whether the raw timestamps were calendar values rather than numbers.
    pub looked_like_epoch: bool,
}

/// Build an [`EventSet`] from flat columns.
///
/// Convenience wrapper around [`ingest`] that drops the warnings.
///
/// # Errors
/// See [`ingest`].
///
/// ```
/// use eventide_core::event_set;
/// use eventide_core::normalize::RawArray;
///
/// let es = event_set(
///     RawArray::from(vec![3.0, 1.0, 2.0]),
///     [
///         ("store", RawArray::from(vec!["a", "b", "a"])),
///         ("sales", RawArray::from(vec![30i64, 10, 20])),
///     ],
///     &["store"],
///     None,
/// )
/// .unwrap();
/// assert_eq!(es.len(), 2);
/// assert_eq!(es.num_events(), 3);
/// ```
pub fn event_set<N, I>(
    timestamps: RawArray,
    features: I,
    indexes: &[&str],
    same_sampling_as: Option<&EventSet>,
) -> Result<EventSet, EventideError>
where
    N: Into<String>,
    I: IntoIterator<Item = (N, RawArray)>,
{
    ingest(timestamps, features, indexes, same_sampling_as).map(|r| r.event_set)
}

/// Build an [`EventSet`] from flat columns, keeping normalization warnings.
///
/// Every feature column must have one value per timestamp. Columns named in
/// `indexes` become index columns and partition the rows; the rest become
/// features in the order given. Each partition is stably sorted by timestamp.
///
/// When `same_sampling_as` is given, the result must have exactly its index
/// keys and timestamps, and reuses its timestamp storage.
///
/// # Errors
/// - Normalization errors (`InvalidTimestamp`, `UnsupportedType`).
/// - `SchemaMismatch` for ragged columns, duplicate or unknown names, or a
///   sampling that differs from `same_sampling_as`.
/// - `UnsupportedType` for an index column that is neither integer nor string.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "eventide::ingest",
        skip(timestamps, features, same_sampling_as),
        fields(events = timestamps.len(), indexes = ?indexes),
    )
)]
pub fn ingest<N, I>(
    timestamps: RawArray,
    features: I,
    indexes: &[&str],
    same_sampling_as: Option<&EventSet>,
) -> Result<IngestReport, EventideError>
where
    N: Into<String>,
    I: IntoIterator<Item = (N, RawArray)>,
{
    let ts = normalize_timestamps(timestamps)?;
    let n = ts.values.len();

    let mut warnings = Vec::new();
    let mut columns: Vec<(String, Column)> = Vec::new();
    for (name, raw) in features {
        let name = name.into();
        let normalized = normalize_feature_values(raw, &name)?;
        if normalized.column.len() != n {
            return Err(EventideError::schema_mismatch(format!(
                "feature {name:?} has {} values but there are {n} timestamps",
                normalized.column.len()
            )));
        }
        warnings.extend(normalized.warning);
        columns.push((name, normalized.column));
    }

    let mut index_columns = Vec::with_capacity(indexes.len());
    for &wanted in indexes {
        let pos = columns
            .iter()
            .position(|(name, _)| name == wanted)
            .ok_or_else(|| {
                EventideError::schema_mismatch(format!(
                    "index column {wanted:?} is not among the supplied columns"
                ))
            })?;
        index_columns.push(columns.remove(pos));
    }

    let schema = Schema::new(
        index_columns
            .iter()
            .map(|(name, col)| IndexSchema::new(name.clone(), col.dtype()))
            .collect(),
        columns
            .iter()
            .map(|(name, col)| FeatureSchema::new(name.clone(), col.dtype()))
            .collect(),
    )?;

    let index_items = index_columns
        .iter()
        .map(|(name, col)| index_items(name, col))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: BTreeMap<IndexKey, Vec<usize>> = BTreeMap::new();
    if index_items.is_empty() {
        groups.insert(IndexKey::empty(), (0..n).collect());
    } else {
        for row in 0..n {
            let key = IndexKey::new(index_items.iter().map(|items| items[row].clone()).collect());
            groups.entry(key).or_default().push(row);
        }
    }

    let mut out = EventSet::new(schema);
    for (key, rows) in groups {
        let group_ts: Vec<f64> = rows.iter().map(|&r| ts.values[r]).collect();
        let order: Vec<usize> = sort_permutation(&group_ts)
            .into_iter()
            .map(|i| rows[i])
            .collect();
        let mut timestamps: Arc<[f64]> = order.iter().map(|&r| ts.values[r]).collect();
        if let Some(shared) = same_sampling_as.and_then(|other| other.try_get(&key))
            && shared.timestamps() == &*timestamps
        {
            timestamps = Arc::clone(shared.shared_timestamps());
        }
        let features = columns
            .iter()
            .map(|(_, col)| col.take(order.iter().map(|&r| Some(r))))
            .collect();
        out.set(key, IndexData::new(timestamps, features)?)?;
    }

    if let Some(other) = same_sampling_as
        && !(out.schema().index() == other.schema().index() && out.same_sampling_as(other))
    {
        return Err(EventideError::schema_mismatch(
            "ingested data does not share the sampling of the reference event set",
        ));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(keys = out.len(), warnings = warnings.len(), "ingested event set");

    Ok(IngestReport {
        event_set: out,
        warnings,
        looked_like_epoch: ts.looked_like_epoch,
    })
}

fn index_items(name: &str, col: &Column) -> Result<Vec<IndexItem>, EventideError> {
    match col {
        Column::Int64(v) => Ok(v.iter().copied().map(IndexItem::Int).collect()),
        Column::Int32(v) => Ok(v.iter().map(|&x| IndexItem::Int(i64::from(x))).collect()),
        Column::String(v) => Ok(v.iter().cloned().map(IndexItem::Bytes).collect()),
        other => Err(EventideError::unsupported(format!(
            "index column {name:?} with dtype {}",
            other.dtype()
        ))),
    }
}
