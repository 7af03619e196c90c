//! Ingestion-boundary normalization.
//!
//! Raw caller data arrives as [`RawArray`] columns tagged with their storage
//! type. These functions turn it into the canonical forms used everywhere
//! else: `FLOAT64` epoch-second timestamps, [`Column`]s of a supported
//! `DType`, and byte/integer [`IndexKey`]s.
//!
//! Failures and warnings follow one rule: anything that would silently change
//! meaning is an error, except object arrays used as features, which are
//! rendered to bytes and reported through [`NormalizedFeature::warning`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::data::{Column, IndexItem, IndexKey};
use crate::{EventideError, StorageType};

/// Lowest accepted date-derived timestamp, in seconds since the Unix epoch.
///
/// Dates at or above this bound are representable with nanosecond precision
/// in an `i64`; anything lower is a null or sentinel date.
pub const MIN_TIMESTAMP_S: f64 = -9_223_372_036.854_775;

const SUPPORTED_FEATURE_DTYPES: &str =
    "float64, float32, int64, int32, text, bytes, bool, datetime, object";

/// One element of an untyped (object) array.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent value.
    Null,
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Calendar date-time, interpreted as UTC.
    DateTime(NaiveDateTime),
}

impl RawValue {
    // Text rendering used when an object array is stored as bytes.
    fn render(&self) -> Vec<u8> {
        match self {
            Self::Null => b"None".to_vec(),
            Self::Int(v) => v.to_string().into_bytes(),
            Self::Float(v) => format!("{v:?}").into_bytes(),
            Self::Bool(true) => b"True".to_vec(),
            Self::Bool(false) => b"False".to_vec(),
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Bytes(b) => b.clone(),
            Self::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string().into_bytes(),
        }
    }
}

/// A caller-supplied array together with its storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArray {
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// 32-bit floats.
    Float32(Vec<f32>),
    /// 64-bit signed integers.
    Int64(Vec<i64>),
    /// 32-bit signed integers.
    Int32(Vec<i32>),
    /// 16-bit signed integers.
    Int16(Vec<i16>),
    /// 8-bit signed integers.
    Int8(Vec<i8>),
    /// 64-bit unsigned integers.
    UInt64(Vec<u64>),
    /// 32-bit unsigned integers.
    UInt32(Vec<u32>),
    /// 16-bit unsigned integers.
    UInt16(Vec<u16>),
    /// 8-bit unsigned integers.
    UInt8(Vec<u8>),
    /// Text values.
    Text(Vec<String>),
    /// Byte strings.
    Bytes(Vec<Vec<u8>>),
    /// Booleans.
    Boolean(Vec<bool>),
    /// Date-times interpreted as UTC; `None` is a null date.
    DateTime(Vec<Option<NaiveDateTime>>),
    /// Untyped values.
    Object(Vec<RawValue>),
}

impl RawArray {
    /// Storage type tag of the array.
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        match self {
            Self::Float64(_) => StorageType::Float64,
            Self::Float32(_) => StorageType::Float32,
            Self::Int64(_) => StorageType::Int64,
            Self::Int32(_) => StorageType::Int32,
            Self::Int16(_) => StorageType::Int16,
            Self::Int8(_) => StorageType::Int8,
            Self::UInt64(_) => StorageType::UInt64,
            Self::UInt32(_) => StorageType::UInt32,
            Self::UInt16(_) => StorageType::UInt16,
            Self::UInt8(_) => StorageType::UInt8,
            Self::Text(_) => StorageType::Text,
            Self::Bytes(_) => StorageType::Bytes,
            Self::Boolean(_) => StorageType::Boolean,
            Self::DateTime(_) => StorageType::DateTime,
            Self::Object(_) => StorageType::Object,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Bytes(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    /// True if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The array as `f64`, for integer and float storage only.
    #[allow(clippy::cast_precision_loss)]
    fn numeric_as_f64(&self) -> Option<Vec<f64>> {
        fn widen<T: Copy>(v: &[T], f: impl Fn(T) -> f64) -> Option<Vec<f64>> {
            Some(v.iter().map(|&x| f(x)).collect())
        }
        match self {
            Self::Float64(v) => Some(v.clone()),
            Self::Float32(v) => widen(v, f64::from),
            Self::Int64(v) => widen(v, |x| x as f64),
            Self::Int32(v) => widen(v, f64::from),
            Self::Int16(v) => widen(v, f64::from),
            Self::Int8(v) => widen(v, f64::from),
            Self::UInt64(v) => widen(v, |x| x as f64),
            Self::UInt32(v) => widen(v, f64::from),
            Self::UInt16(v) => widen(v, f64::from),
            Self::UInt8(v) => widen(v, f64::from),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for RawArray {
    fn from(v: Vec<f64>) -> Self {
        Self::Float64(v)
    }
}

impl From<Vec<f32>> for RawArray {
    fn from(v: Vec<f32>) -> Self {
        Self::Float32(v)
    }
}

impl From<Vec<i64>> for RawArray {
    fn from(v: Vec<i64>) -> Self {
        Self::Int64(v)
    }
}

impl From<Vec<i32>> for RawArray {
    fn from(v: Vec<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<Vec<bool>> for RawArray {
    fn from(v: Vec<bool>) -> Self {
        Self::Boolean(v)
    }
}

impl From<Vec<&str>> for RawArray {
    fn from(v: Vec<&str>) -> Self {
        Self::Text(v.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for RawArray {
    fn from(v: Vec<String>) -> Self {
        Self::Text(v)
    }
}

/// Canonical timestamps plus whether the input was a calendar representation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTimestamps {
    /// Seconds since the Unix epoch.
    pub values: Vec<f64>,
    /// True if the input was date/time typed or textual, false for numeric input.
    pub looked_like_epoch: bool,
}

/// Normalize raw timestamps to `FLOAT64` seconds since the Unix epoch.
///
/// - Integer and float arrays are widened to `f64`; NaN is rejected.
/// - Text, byte and object arrays are parsed as UTC date-times.
/// - Date-time arrays are converted at nanosecond resolution.
///
/// # Errors
/// - `InvalidTimestamp` for NaN, unparseable text, null dates, or dates below
///   [`MIN_TIMESTAMP_S`].
/// - `UnsupportedType` for boolean arrays.
///
/// ```
/// use eventide_core::normalize::{normalize_timestamps, RawArray};
///
/// let ts = normalize_timestamps(RawArray::from(vec!["1970-01-01 00:00:00", "2023-01-01 00:01:00"]))
///     .unwrap();
/// assert_eq!(ts.values, vec![0.0, 1_672_531_260.0]);
/// assert!(ts.looked_like_epoch);
/// ```
pub fn normalize_timestamps(raw: RawArray) -> Result<NormalizedTimestamps, EventideError> {
    if let Some(values) = raw.numeric_as_f64() {
        if let Some(i) = values.iter().position(|v| v.is_nan()) {
            return Err(EventideError::InvalidTimestamp(format!(
                "timestamp {i} is NaN"
            )));
        }
        return Ok(NormalizedTimestamps {
            values,
            looked_like_epoch: false,
        });
    }

    let dates: Vec<Option<NaiveDateTime>> = match raw {
        RawArray::DateTime(v) => v,
        RawArray::Text(v) => v.iter().map(|s| parse_datetime(s)).collect::<Result<_, _>>()?,
        RawArray::Bytes(v) => v
            .iter()
            .map(|b| parse_datetime(&String::from_utf8_lossy(b)))
            .collect::<Result<_, _>>()?,
        RawArray::Object(v) => v.iter().map(object_datetime).collect::<Result<_, _>>()?,
        other => {
            return Err(EventideError::unsupported(format!(
                "timestamps with storage {} (expected integers, floats, text or date-times)",
                other.storage_type()
            )));
        }
    };

    let mut values = Vec::with_capacity(dates.len());
    for (i, dt) in dates.into_iter().enumerate() {
        let secs = dt.and_then(datetime_to_seconds).ok_or_else(|| {
            EventideError::InvalidTimestamp(format!("timestamp {i} is null or out of range"))
        })?;
        if secs < MIN_TIMESTAMP_S {
            return Err(EventideError::InvalidTimestamp(format!(
                "timestamp {i} ({secs}) is below the minimum valid epoch"
            )));
        }
        values.push(secs);
    }
    Ok(NormalizedTimestamps {
        values,
        looked_like_epoch: true,
    })
}

/// Seconds since the epoch at nanosecond resolution, if representable.
#[allow(clippy::cast_precision_loss)]
fn datetime_to_seconds(dt: NaiveDateTime) -> Option<f64> {
    dt.and_utc()
        .timestamp_nanos_opt()
        .map(|ns| ns as f64 / 1e9)
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse one textual date-time. `"NaT"` and the empty string are null dates.
fn parse_datetime(s: &str) -> Result<Option<NaiveDateTime>, EventideError> {
    let s = s.trim();
    if s.is_empty() || s == "NaT" {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.naive_utc()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(dt));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0));
    }
    Err(EventideError::InvalidTimestamp(format!(
        "cannot parse {s:?} as a date-time"
    )))
}

fn object_datetime(v: &RawValue) -> Result<Option<NaiveDateTime>, EventideError> {
    match v {
        RawValue::Null => Ok(None),
        RawValue::DateTime(dt) => Ok(Some(*dt)),
        RawValue::Text(s) => parse_datetime(s),
        RawValue::Bytes(b) => parse_datetime(&String::from_utf8_lossy(b)),
        other => Err(EventideError::InvalidTimestamp(format!(
            "object timestamp {:?} is not a date",
            String::from_utf8_lossy(&other.render())
        ))),
    }
}

/// A normalized feature column and the warning raised while producing it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFeature {
    /// The canonical column.
    pub column: Column,
    /// Set when the input was an object array rendered to bytes.
    pub warning: Option<String>,
}

/// Normalize one raw feature array named `name`.
///
/// - Date-time arrays become `FLOAT64` seconds; null dates become NaN.
/// - Text and byte arrays become `STRING` columns.
/// - Object arrays are rendered element-wise to text and stored as `STRING`,
///   with a warning.
/// - Other storage types must map to a supported dtype.
///
/// # Errors
/// Returns `UnsupportedType` for storage types outside the supported set
/// (e.g. unsigned or 16-bit integers).
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "eventide::normalize::feature",
        skip(raw),
        fields(storage = %raw.storage_type(), len = raw.len()),
    )
)]
pub fn normalize_feature_values(
    raw: RawArray,
    name: &str,
) -> Result<NormalizedFeature, EventideError> {
    let column = match raw {
        RawArray::Float64(v) => Column::Float64(v),
        RawArray::Float32(v) => Column::Float32(v),
        RawArray::Int64(v) => Column::Int64(v),
        RawArray::Int32(v) => Column::Int32(v),
        RawArray::Boolean(v) => Column::Boolean(v),
        RawArray::Text(v) => Column::String(v.into_iter().map(String::into_bytes).collect()),
        RawArray::Bytes(v) => Column::String(v),
        RawArray::DateTime(v) => Column::Float64(
            v.into_iter()
                .map(|dt| dt.and_then(datetime_to_seconds).unwrap_or(f64::NAN))
                .collect(),
        ),
        RawArray::Object(v) => {
            let warning = format!(
                "feature {name:?} is an array of untyped objects and will be cast to STRING"
            );
            #[cfg(feature = "tracing")]
            tracing::warn!(feature = %name, "object array cast to STRING");
            return Ok(NormalizedFeature {
                column: Column::String(v.iter().map(RawValue::render).collect()),
                warning: Some(warning),
            });
        }
        other => {
            return Err(EventideError::unsupported(format!(
                "feature {name:?} with storage {} (supported: {})",
                other.storage_type(),
                SUPPORTED_FEATURE_DTYPES
            )));
        }
    };
    Ok(NormalizedFeature {
        column,
        warning: None,
    })
}

/// Caller-supplied index item before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawIndexItem {
    /// Integer item, kept as is.
    Int(i64),
    /// Text item, encoded as UTF-8 bytes.
    Text(String),
    /// Byte-string item, kept as is.
    Bytes(Vec<u8>),
    /// Floating point item; always rejected.
    Float(f64),
    /// Boolean item; always rejected.
    Bool(bool),
}

impl From<i64> for RawIndexItem {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RawIndexItem {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for RawIndexItem {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for RawIndexItem {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for RawIndexItem {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<f64> for RawIndexItem {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Caller-supplied index key: a bare item or a tuple of items.
#[derive(Debug, Clone, PartialEq)]
pub enum RawIndexKey {
    /// A single item, equivalent to a one-element tuple.
    Item(RawIndexItem),
    /// A multi-column key.
    Tuple(Vec<RawIndexItem>),
}

impl From<RawIndexItem> for RawIndexKey {
    fn from(v: RawIndexItem) -> Self {
        Self::Item(v)
    }
}

impl From<&str> for RawIndexKey {
    fn from(v: &str) -> Self {
        Self::Item(v.into())
    }
}

impl From<i64> for RawIndexKey {
    fn from(v: i64) -> Self {
        Self::Item(v.into())
    }
}

/// Caller-supplied selection of index keys.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKeyList {
    /// A single key, bare or tuple.
    One(RawIndexKey),
    /// Several keys, each bare or tuple.
    Many(Vec<RawIndexKey>),
}

/// Normalize one index item.
///
/// # Errors
/// Returns `UnsupportedType` for float and boolean items.
pub fn normalize_index_item(item: RawIndexItem) -> Result<IndexItem, EventideError> {
    match item {
        RawIndexItem::Int(v) => Ok(IndexItem::Int(v)),
        RawIndexItem::Text(s) => Ok(IndexItem::Bytes(s.into_bytes())),
        RawIndexItem::Bytes(b) => Ok(IndexItem::Bytes(b)),
        RawIndexItem::Float(v) => Err(EventideError::unsupported(format!(
            "index item {v:?} (index items must be integers, text or bytes)"
        ))),
        RawIndexItem::Bool(v) => Err(EventideError::unsupported(format!(
            "index item {v} (index items must be integers, text or bytes)"
        ))),
    }
}

/// Normalize one index key. `None` is the empty key.
///
/// # Errors
/// Propagates `UnsupportedType` from [`normalize_index_item`].
pub fn normalize_index_key(key: Option<RawIndexKey>) -> Result<IndexKey, EventideError> {
    let items = match key {
        None => Vec::new(),
        Some(RawIndexKey::Item(item)) => vec![normalize_index_item(item)?],
        Some(RawIndexKey::Tuple(items)) => items
            .into_iter()
            .map(normalize_index_item)
            .collect::<Result<_, _>>()?,
    };
    Ok(IndexKey::new(items))
}

/// Normalize a selection of index keys.
///
/// - A bare item becomes a one-element list holding a one-item key.
/// - A tuple becomes a one-element list holding a multi-item key.
/// - A list is normalized element-wise.
/// - `None` resolves to every key in `available` when given, else to nothing.
///
/// # Errors
/// Propagates `UnsupportedType` from [`normalize_index_item`].
///
/// ```
/// use eventide_core::normalize::{normalize_index_key_list, IndexKeyList, RawIndexKey};
/// use eventide_core::{IndexItem, IndexKey};
///
/// let keys = normalize_index_key_list(Some(IndexKeyList::One(RawIndexKey::from("a"))), None).unwrap();
/// assert_eq!(keys, vec![IndexKey::from([IndexItem::text("a")])]);
/// ```
pub fn normalize_index_key_list(
    requested: Option<IndexKeyList>,
    available: Option<&[IndexKey]>,
) -> Result<Vec<IndexKey>, EventideError> {
    match requested {
        None => Ok(available.map(<[IndexKey]>::to_vec).unwrap_or_default()),
        Some(IndexKeyList::One(key)) => Ok(vec![normalize_index_key(Some(key))?]),
        Some(IndexKeyList::Many(keys)) => keys
            .into_iter()
            .map(|k| normalize_index_key(Some(k)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_text_formats() {
        for s in [
            "2023-01-01",
            "2023-01-01 00:00",
            "2023-01-01T00:00:00",
            "2023-01-01T00:00:00.000",
            "2023-01-01T00:00:00Z",
            "2023-01-01T01:00:00+01:00",
        ] {
            let dt = parse_datetime(s).unwrap().unwrap();
            assert_eq!(dt.and_utc().timestamp(), 1_672_531_200, "{s}");
        }
        assert_eq!(parse_datetime("NaT").unwrap(), None);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn object_values_render_like_text() {
        assert_eq!(RawValue::Int(3).render(), b"3");
        assert_eq!(RawValue::Float(1.5).render(), b"1.5");
        assert_eq!(RawValue::Bool(true).render(), b"True");
        assert_eq!(RawValue::Null.render(), b"None");
    }
}
