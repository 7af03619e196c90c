use core::fmt;
use serde::{Deserialize, Serialize};

use crate::{EventideError, Value};

/// Primitive element type of a feature or index column.
///
/// The set is closed. Strings are always stored as UTF-8 byte sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DType {
    /// 64-bit float.
    Float64,
    /// 32-bit float.
    Float32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit signed integer.
    Int32,
    /// UTF-8 text stored as bytes.
    String,
    /// Boolean.
    Boolean,
}

impl DType {
    /// Stable upper-case identifier for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float64 => "FLOAT64",
            Self::Float32 => "FLOAT32",
            Self::Int64 => "INT64",
            Self::Int32 => "INT32",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
        }
    }

    /// Canonical storage type for values of this dtype.
    #[must_use]
    pub const fn storage_type(self) -> StorageType {
        match self {
            Self::Float64 => StorageType::Float64,
            Self::Float32 => StorageType::Float32,
            Self::Int64 => StorageType::Int64,
            Self::Int32 => StorageType::Int32,
            Self::String => StorageType::Bytes,
            Self::Boolean => StorageType::Boolean,
        }
    }

    /// True for `Float64` and `Float32`.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float64 | Self::Float32)
    }

    /// True for `Int64` and `Int32`.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int64 | Self::Int32)
    }

    /// True for float and integer dtypes.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_float() || self.is_integer()
    }

    /// True for the dtypes an index column may use.
    #[must_use]
    pub const fn is_index_compatible(self) -> bool {
        matches!(self, Self::Int64 | Self::Int32 | Self::String)
    }

    /// Value used for positions that have no source data (e.g. before the first
    /// sampled event): NaN for floats, zero for integers, empty for strings and
    /// false for booleans.
    #[must_use]
    pub fn missing_value(self) -> Value {
        match self {
            Self::Float64 => Value::Float64(f64::NAN),
            Self::Float32 => Value::Float32(f32::NAN),
            Self::Int64 => Value::Int64(0),
            Self::Int32 => Value::Int32(0),
            Self::String => Value::String(Vec::new()),
            Self::Boolean => Value::Boolean(false),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical storage type of raw input data, before normalization.
///
/// This is a superset of what the engine accepts; [`DType::try_from`] decides
/// which storage types map onto a dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StorageType {
    /// `f64`
    Float64,
    /// `f32`
    Float32,
    /// `i64`
    Int64,
    /// `i32`
    Int32,
    /// `i16`
    Int16,
    /// `i8`
    Int8,
    /// `u64`
    UInt64,
    /// `u32`
    UInt32,
    /// `u16`
    UInt16,
    /// `u8`
    UInt8,
    /// Unicode text.
    Text,
    /// Byte strings.
    Bytes,
    /// `bool`
    Boolean,
    /// Nanosecond date-time values.
    DateTime,
    /// Heterogeneous generic objects.
    Object,
}

impl StorageType {
    /// Lower-case identifier for error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float64 => "float64",
            Self::Float32 => "float32",
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Int16 => "int16",
            Self::Int8 => "int8",
            Self::UInt64 => "uint64",
            Self::UInt32 => "uint32",
            Self::UInt16 => "uint16",
            Self::UInt8 => "uint8",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Boolean => "bool",
            Self::DateTime => "datetime",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<StorageType> for DType {
    type Error = EventideError;

    /// Map a storage type onto its dtype.
    ///
    /// Date-times map to `Int64` (nanoseconds); generic objects are never mapped
    /// implicitly and must go through feature normalization first.
    ///
    /// ```
    /// use eventide_types::{DType, StorageType};
    /// assert_eq!(DType::try_from(StorageType::Text).unwrap(), DType::String);
    /// assert!(DType::try_from(StorageType::UInt8).is_err());
    /// ```
    fn try_from(storage: StorageType) -> Result<Self, Self::Error> {
        match storage {
            StorageType::Float64 => Ok(Self::Float64),
            StorageType::Float32 => Ok(Self::Float32),
            StorageType::Int64 | StorageType::DateTime => Ok(Self::Int64),
            StorageType::Int32 => Ok(Self::Int32),
            StorageType::Text | StorageType::Bytes => Ok(Self::String),
            StorageType::Boolean => Ok(Self::Boolean),
            other => Err(EventideError::unsupported(format!(
                "storage type {other} (supported: float64, float32, int64, int32, text, bytes, bool, datetime)"
            ))),
        }
    }
}
