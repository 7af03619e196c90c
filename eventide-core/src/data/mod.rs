//! Runtime containers for indexed time series.
//!
//! - `key`: normalized index keys.
//! - `column`: typed, homogeneous feature columns.
//! - `event_set`: `IndexData` (one partition) and `EventSet` (all partitions plus schema).
/// Typed feature columns.
pub mod column;
/// `IndexData` and `EventSet`.
pub mod event_set;
/// Normalized index keys.
pub mod key;

pub use column::Column;
pub use event_set::{EventSet, IndexData};
pub use key::{IndexItem, IndexKey};
