use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::{Column, IndexKey};
use crate::timeseries::util::ensure_ascending;
use crate::{EventideError, Schema};

/// Timestamps and feature columns of one index key.
///
/// Invariants, checked by [`IndexData::new`]:
/// - timestamps are ascending (ties allowed) and never NaN;
/// - every feature column has exactly one element per timestamp.
///
/// Timestamps are reference counted so operators that keep their input's
/// sampling can share the sequence instead of copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    timestamps: Arc<[f64]>,
    features: Vec<Column>,
}

impl IndexData {
    /// Build one partition.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the timestamps are not ascending or a
    /// column's length differs from the timestamp count.
    pub fn new(
        timestamps: impl Into<Arc<[f64]>>,
        features: Vec<Column>,
    ) -> Result<Self, EventideError> {
        let timestamps = timestamps.into();
        ensure_ascending(&timestamps)?;
        if let Some((i, c)) = features
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != timestamps.len())
        {
            return Err(EventideError::schema_mismatch(format!(
                "feature column {i} has {} values but there are {} timestamps",
                c.len(),
                timestamps.len()
            )));
        }
        Ok(Self {
            timestamps,
            features,
        })
    }

    /// Ascending timestamps in seconds since the Unix epoch.
    #[must_use]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Shared handle to the timestamps.
    #[must_use]
    pub const fn shared_timestamps(&self) -> &Arc<[f64]> {
        &self.timestamps
    }

    /// Feature columns in schema order.
    #[must_use]
    pub fn features(&self) -> &[Column] {
        &self.features
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True if the partition holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Indexed collection of time series sharing one schema.
///
/// Maps each normalized [`IndexKey`] to its [`IndexData`]. Keys iterate in
/// ascending key order, so [`EventSet::index_keys`] is stable for an instance
/// and identical across event sets holding the same keys.
///
/// ```
/// use eventide_core::{Column, DType, EventSet, FeatureSchema, IndexData, IndexKey, Schema};
///
/// let schema = Schema::unindexed(vec![FeatureSchema::new("x", DType::Int32)]).unwrap();
/// let mut es = EventSet::new(schema);
/// es.set(IndexKey::empty(), IndexData::new(vec![1.0, 2.0], vec![Column::Int32(vec![5, 6])]).unwrap())
///     .unwrap();
/// assert_eq!(es.get(&IndexKey::empty()).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EventSet {
    schema: Arc<Schema>,
    data: BTreeMap<IndexKey, IndexData>,
}

impl EventSet {
    /// Empty event set.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            data: BTreeMap::new(),
        }
    }

    /// The event set's schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shared handle to the schema.
    #[must_use]
    pub const fn shared_schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Data stored under `key`.
    ///
    /// # Errors
    /// Returns `KeyNotFound` if the key is absent.
    pub fn get(&self, key: &IndexKey) -> Result<&IndexData, EventideError> {
        self.data
            .get(key)
            .ok_or_else(|| EventideError::key_not_found(key.to_string()))
    }

    /// Data stored under `key`, if any.
    #[must_use]
    pub fn try_get(&self, key: &IndexKey) -> Option<&IndexData> {
        self.data.get(key)
    }

    /// Insert or replace the data for `key`.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the key's arity or item types disagree with
    /// the index columns, or if the column count or dtypes disagree with the
    /// feature columns. Length and ordering are already guaranteed by `IndexData`.
    pub fn set(&mut self, key: IndexKey, data: IndexData) -> Result<(), EventideError> {
        self.check_key(&key)?;
        let expected = self.schema.features();
        if data.features.len() != expected.len() {
            return Err(EventideError::schema_mismatch(format!(
                "index key {key} has {} feature columns, schema declares {}",
                data.features.len(),
                expected.len()
            )));
        }
        for (col, decl) in data.features.iter().zip(expected) {
            if col.dtype() != decl.dtype {
                return Err(EventideError::schema_mismatch(format!(
                    "feature {:?} under index key {key} has dtype {}, schema declares {}",
                    decl.name,
                    col.dtype(),
                    decl.dtype
                )));
            }
        }
        self.data.insert(key, data);
        Ok(())
    }

    fn check_key(&self, key: &IndexKey) -> Result<(), EventideError> {
        let index = self.schema.index();
        if key.len() != index.len() {
            return Err(EventideError::schema_mismatch(format!(
                "index key {key} has {} items, schema declares {} index columns",
                key.len(),
                index.len()
            )));
        }
        if let Some((item, decl)) = key
            .items()
            .iter()
            .zip(index)
            .find(|(item, decl)| !item.fits(decl.dtype))
        {
            return Err(EventideError::schema_mismatch(format!(
                "index item {item} does not fit index column {:?} of dtype {}",
                decl.name, decl.dtype
            )));
        }
        Ok(())
    }

    /// Index keys in ascending key order.
    pub fn index_keys(&self) -> impl ExactSizeIterator<Item = &IndexKey> {
        self.data.keys()
    }

    /// `(key, data)` pairs in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&IndexKey, &IndexData)> {
        self.data.iter()
    }

    /// Number of index keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the event set holds no index keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total number of events across all keys.
    #[must_use]
    pub fn num_events(&self) -> usize {
        self.data.values().map(IndexData::len).sum()
    }

    /// Column `name` under `key`.
    ///
    /// # Errors
    /// Returns `KeyNotFound` for an absent key, `SchemaMismatch` for an unknown feature.
    pub fn column(&self, key: &IndexKey, name: &str) -> Result<&Column, EventideError> {
        let (i, _) = self.schema.feature(name).ok_or_else(|| {
            EventideError::schema_mismatch(format!("no feature named {name:?}"))
        })?;
        Ok(&self.get(key)?.features[i])
    }

    /// True iff both event sets hold the same index keys and, for every key,
    /// element-wise identical timestamps.
    #[must_use]
    pub fn same_sampling_as(&self, other: &Self) -> bool {
        self.data.len() == other.data.len()
            && self.data.iter().zip(&other.data).all(|((ka, a), (kb, b))| {
                ka == kb
                    && (Arc::ptr_eq(&a.timestamps, &b.timestamps)
                        || a.timestamps() == b.timestamps())
            })
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = (&'a IndexKey, &'a IndexData);
    type IntoIter = std::collections::btree_map::Iter<'a, IndexKey, IndexData>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
