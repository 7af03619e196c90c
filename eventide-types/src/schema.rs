//! Static description of an event set's columns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DType, EventideError};

/// Name and dtype of one feature column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Column name, unique among the schema's features.
    pub name: String,
    /// Element dtype.
    pub dtype: DType,
}

/// Name and dtype of one index column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Column name, unique among the schema's index columns.
    pub name: String,
    /// Element dtype; one of `INT64`, `INT32` or `STRING`.
    pub dtype: DType,
}

impl FeatureSchema {
    /// Construct a feature column description.
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

impl IndexSchema {
    /// Construct an index column description.
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Ordered index and feature column declarations.
///
/// Equality is structural and order-sensitive for both sequences.
/// Deserialization applies the same checks as [`Schema::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    index: Vec<IndexSchema>,
    features: Vec<FeatureSchema>,
}

#[derive(Deserialize)]
struct RawSchema {
    index: Vec<IndexSchema>,
    features: Vec<FeatureSchema>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = EventideError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Self::new(raw.index, raw.features)
    }
}

impl Schema {
    /// Build a schema, validating name uniqueness and index dtypes.
    ///
    /// # Errors
    /// - `SchemaMismatch` if a name repeats within the index or within the features.
    /// - `UnsupportedType` if an index column is neither integer nor string.
    ///
    /// ```
    /// use eventide_types::{DType, IndexSchema, FeatureSchema, Schema};
    /// let schema = Schema::new(
    ///     vec![IndexSchema::new("symbol", DType::String)],
    ///     vec![FeatureSchema::new("price", DType::Float64)],
    /// ).unwrap();
    /// assert_eq!(schema.feature_names().collect::<Vec<_>>(), ["price"]);
    /// ```
    pub fn new(index: Vec<IndexSchema>, features: Vec<FeatureSchema>) -> Result<Self, EventideError> {
        ensure_unique(index.iter().map(|c| c.name.as_str()), "index")?;
        ensure_unique(features.iter().map(|c| c.name.as_str()), "feature")?;
        if let Some(bad) = index.iter().find(|c| !c.dtype.is_index_compatible()) {
            return Err(EventideError::unsupported(format!(
                "index column {:?} with dtype {} (index columns must be INT64, INT32 or STRING)",
                bad.name, bad.dtype
            )));
        }
        Ok(Self { index, features })
    }

    /// Schema without index columns.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` on duplicate feature names.
    pub fn unindexed(features: Vec<FeatureSchema>) -> Result<Self, EventideError> {
        Self::new(Vec::new(), features)
    }

    /// Same index columns, new features.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` on duplicate feature names.
    pub fn with_features(&self, features: Vec<FeatureSchema>) -> Result<Self, EventideError> {
        Self::new(self.index.clone(), features)
    }

    /// Index column declarations.
    #[must_use]
    pub fn index(&self) -> &[IndexSchema] {
        &self.index
    }

    /// Feature column declarations.
    #[must_use]
    pub fn features(&self) -> &[FeatureSchema] {
        &self.features
    }

    /// Look up a feature by name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<(usize, &FeatureSchema)> {
        self.features.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Feature names in declaration order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Feature dtypes in declaration order.
    pub fn feature_dtypes(&self) -> impl Iterator<Item = DType> + '_ {
        self.features.iter().map(|f| f.dtype)
    }

    /// Index dtypes in declaration order.
    pub fn index_dtypes(&self) -> impl Iterator<Item = DType> + '_ {
        self.index.iter().map(|c| c.dtype)
    }
}

fn ensure_unique<'a>(
    names: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<(), EventideError> {
    let mut seen = HashSet::new();
    for n in names {
        if !seen.insert(n) {
            return Err(EventideError::schema_mismatch(format!(
                "duplicate {what} column name {n:?}"
            )));
        }
    }
    Ok(())
}
