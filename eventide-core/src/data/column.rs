use crate::{DType, Value};

/// A homogeneous feature column.
///
/// `STRING` elements are stored as raw byte sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// `FLOAT64` values.
    Float64(Vec<f64>),
    /// `FLOAT32` values.
    Float32(Vec<f32>),
    /// `INT64` values.
    Int64(Vec<i64>),
    /// `INT32` values.
    Int32(Vec<i32>),
    /// `STRING` values as bytes.
    String(Vec<Vec<u8>>),
    /// `BOOLEAN` values.
    Boolean(Vec<bool>),
}

// Expands `$body` once per variant with `$v` bound to the inner vector.
macro_rules! each_column {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Float64($v) => $body,
            Column::Float32($v) => $body,
            Column::Int64($v) => $body,
            Column::Int32($v) => $body,
            Column::String($v) => $body,
            Column::Boolean($v) => $body,
        }
    };
}

// Like `each_column!`, but rebuilds a column of the same variant from `$body`.
macro_rules! map_column {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Float64($v) => Column::Float64($body),
            Column::Float32($v) => Column::Float32($body),
            Column::Int64($v) => Column::Int64($body),
            Column::Int32($v) => Column::Int32($body),
            Column::String($v) => Column::String($body),
            Column::Boolean($v) => Column::Boolean($body),
        }
    };
}

impl Column {
    /// Empty column of `dtype` with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(dtype: DType, capacity: usize) -> Self {
        match dtype {
            DType::Float64 => Self::Float64(Vec::with_capacity(capacity)),
            DType::Float32 => Self::Float32(Vec::with_capacity(capacity)),
            DType::Int64 => Self::Int64(Vec::with_capacity(capacity)),
            DType::Int32 => Self::Int32(Vec::with_capacity(capacity)),
            DType::String => Self::String(Vec::with_capacity(capacity)),
            DType::Boolean => Self::Boolean(Vec::with_capacity(capacity)),
        }
    }

    /// Column of `len` missing values of `dtype`.
    #[must_use]
    pub fn missing(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::Float64 => Self::Float64(vec![f64::NAN; len]),
            DType::Float32 => Self::Float32(vec![f32::NAN; len]),
            DType::Int64 => Self::Int64(vec![0; len]),
            DType::Int32 => Self::Int32(vec![0; len]),
            DType::String => Self::String(vec![Vec::new(); len]),
            DType::Boolean => Self::Boolean(vec![false; len]),
        }
    }

    /// Element dtype.
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

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        each_column!(self, v => v.len())
    }

    /// True if the column holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `i` as a scalar.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<Value> {
        match self {
            Self::Float64(v) => v.get(i).copied().map(Value::Float64),
            Self::Float32(v) => v.get(i).copied().map(Value::Float32),
            Self::Int64(v) => v.get(i).copied().map(Value::Int64),
            Self::Int32(v) => v.get(i).copied().map(Value::Int32),
            Self::String(v) => v.get(i).cloned().map(Value::String),
            Self::Boolean(v) => v.get(i).copied().map(Value::Boolean),
        }
    }

    /// Iterate elements as scalars.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    /// Append a scalar of exactly this column's dtype.
    ///
    /// # Errors
    /// Hands the value back if its dtype differs from the column's.
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        match (self, value) {
            (Self::Float64(v), Value::Float64(x)) => v.push(x),
            (Self::Float32(v), Value::Float32(x)) => v.push(x),
            (Self::Int64(v), Value::Int64(x)) => v.push(x),
            (Self::Int32(v), Value::Int32(x)) => v.push(x),
            (Self::String(v), Value::String(x)) => v.push(x),
            (Self::Boolean(v), Value::Boolean(x)) => v.push(x),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// Gather elements by position; `None` yields the dtype's missing value.
    ///
    /// Positions must be in bounds.
    #[must_use]
    pub fn take<I>(&self, positions: I) -> Self
    where
        I: IntoIterator<Item = Option<usize>>,
    {
        match self {
            Self::Float64(v) => Self::Float64(gather(v, positions, f64::NAN)),
            Self::Float32(v) => Self::Float32(gather(v, positions, f32::NAN)),
            Self::Int64(v) => Self::Int64(gather(v, positions, 0)),
            Self::Int32(v) => Self::Int32(gather(v, positions, 0)),
            Self::String(v) => Self::String(gather(v, positions, Vec::new())),
            Self::Boolean(v) => Self::Boolean(gather(v, positions, false)),
        }
    }

    /// Contiguous copy of `range`.
    #[must_use]
    pub fn slice(&self, range: core::ops::Range<usize>) -> Self {
        map_column!(self, v => v[range].to_vec())
    }

    /// The column widened to `f64`, for numeric dtypes only.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Float64(v) => Some(v.clone()),
            Self::Float32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Self::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Int32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Self::String(_) | Self::Boolean(_) => None,
        }
    }
}

fn gather<T: Clone, I>(src: &[T], positions: I, missing: T) -> Vec<T>
where
    I: IntoIterator<Item = Option<usize>>,
{
    positions
        .into_iter()
        .map(|p| p.map_or_else(|| missing.clone(), |i| src[i].clone()))
        .collect()
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Self::Float64(v)
    }
}

impl From<Vec<f32>> for Column {
    fn from(v: Vec<f32>) -> Self {
        Self::Float32(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Self::Int64(v)
    }
}

impl From<Vec<i32>> for Column {
    fn from(v: Vec<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Self::Boolean(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Self::String(v.into_iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}
