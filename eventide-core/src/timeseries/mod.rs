//! Algorithms over ascending timestamp sequences of a single index key.
//!
//! Modules include:
//! - `sample`: last-known-value alignment of a source sequence onto a query sequence
//! - `window`: trailing time-window aggregation
//! - `util`: ordering checks shared by containers and operators
/// Last-known-value sampling indices.
pub mod sample;
/// Shared ordering helpers.
pub mod util;
/// Trailing window aggregation.
pub mod window;
