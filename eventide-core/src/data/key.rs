use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{DType, Value};

/// One normalized element of an index key.
///
/// Text is always stored as UTF-8 bytes; integers are widened to `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexItem {
    /// Integer index value (`INT64` or `INT32` column).
    Int(i64),
    /// Byte-string index value (`STRING` column).
    Bytes(Vec<u8>),
}

impl IndexItem {
    /// Byte-string item from text.
    pub fn text(s: impl AsRef<str>) -> Self {
        Self::Bytes(s.as_ref().as_bytes().to_vec())
    }

    /// True if this item can be stored in an index column of `dtype`.
    #[must_use]
    pub fn fits(&self, dtype: DType) -> bool {
        match (self, dtype) {
            (Self::Int(_), DType::Int64) | (Self::Bytes(_), DType::String) => true,
            (Self::Int(v), DType::Int32) => i32::try_from(*v).is_ok(),
            _ => false,
        }
    }

    /// The item as a scalar of the given index dtype, if it fits.
    #[must_use]
    pub fn to_value(&self, dtype: DType) -> Option<Value> {
        if !self.fits(dtype) {
            return None;
        }
        match self {
            Self::Int(v) => Value::Int64(*v).coerce_to(dtype),
            Self::Bytes(b) => Some(Value::String(b.clone())),
        }
    }
}

impl fmt::Display for IndexItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
        }
    }
}

impl From<i64> for IndexItem {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for IndexItem {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for IndexItem {
    fn from(v: &str) -> Self {
        Self::text(v)
    }
}

impl From<Vec<u8>> for IndexItem {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Normalized index key: an ordered tuple of index items.
///
/// The empty key is the single partition of an unindexed event set.
/// Keys order lexicographically, which gives event sets a stable key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexKey(Vec<IndexItem>);

impl IndexKey {
    /// Key from already-normalized items.
    #[must_use]
    pub const fn new(items: Vec<IndexItem>) -> Self {
        Self(items)
    }

    /// The empty key.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Items in index-column order.
    #[must_use]
    pub fn items(&self) -> &[IndexItem] {
        &self.0
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<IndexItem>> for IndexKey {
    fn from(items: Vec<IndexItem>) -> Self {
        Self(items)
    }
}

impl<const N: usize> From<[IndexItem; N]> for IndexKey {
    fn from(items: [IndexItem; N]) -> Self {
        Self(items.into())
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}
