use core::fmt;
use serde::{Deserialize, Serialize};

use crate::DType;

/// A single scalar of one of the engine's dtypes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// `FLOAT64` scalar.
    Float64(f64),
    /// `FLOAT32` scalar.
    Float32(f32),
    /// `INT64` scalar.
    Int64(i64),
    /// `INT32` scalar.
    Int32(i32),
    /// `STRING` scalar, as UTF-8 bytes.
    String(Vec<u8>),
    /// `BOOLEAN` scalar.
    Boolean(bool),
}

impl Value {
    /// Dtype of this scalar.
    #[must_use]
    pub const fn dtype(&self) -> DType {
        match self {
            Self::Float64(_) => DType::Float64,
            Self::Float32(_) => DType::Float32,
            Self::Int64(_) => DType::Int64,
            Self::Int32(_) => DType::Int32,
            Self::String(_) => DType::String,
            Self::Boolean(_) => DType::Boolean,
        }
    }

    /// Build a string value from text.
    pub fn string(text: impl AsRef<str>) -> Self {
        Self::String(text.as_ref().as_bytes().to_vec())
    }

    /// Numeric view of the scalar; booleans read as 0/1, strings have none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float64(v) => Some(v),
            Self::Float32(v) => Some(f64::from(v)),
            Self::Int64(v) => Some(v as f64),
            Self::Int32(v) => Some(f64::from(v)),
            Self::Boolean(v) => Some(if v { 1.0 } else { 0.0 }),
            Self::String(_) => None,
        }
    }

    /// Convert this scalar so it can be stored in a column of `dtype`.
    ///
    /// - Numeric targets accept any numeric or boolean value. Integer targets
    ///   reject non-finite floats and values outside their range; finite floats
    ///   truncate toward zero.
    /// - `STRING` and `BOOLEAN` targets only accept their own dtype.
    ///
    /// Returns `None` when the value cannot be represented.
    ///
    /// ```
    /// use eventide_types::{DType, Value};
    /// assert_eq!(Value::Int64(3).coerce_to(DType::Int32), Some(Value::Int32(3)));
    /// assert_eq!(Value::string("x").coerce_to(DType::Int32), None);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce_to(&self, dtype: DType) -> Option<Self> {
        if self.dtype() == dtype {
            return Some(self.clone());
        }
        match dtype {
            DType::String | DType::Boolean => None,
            DType::Float64 => self.as_f64().map(Self::Float64),
            DType::Float32 => self.as_f64().map(|v| Self::Float32(v as f32)),
            DType::Int64 => self.as_i64().map(Self::Int64),
            DType::Int32 => self
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Int32),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int64(v) => Some(v),
            Self::Int32(v) => Some(i64::from(v)),
            Self::Boolean(v) => Some(i64::from(v)),
            Self::Float64(_) | Self::Float32(_) => {
                let v = self.as_f64()?.trunc();
                if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
            Self::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float64(v) => write!(f, "{v:?}"),
            Self::Float32(v) => write!(f, "{v:?}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{:?}", String::from_utf8_lossy(v)),
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::string(v)
    }
}
