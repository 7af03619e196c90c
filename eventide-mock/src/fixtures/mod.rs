//! Deterministic event sets shared by tests and examples.
//!
//! Every fixture is rebuilt on each call, so callers are free to consume or
//! modify what they get.

/// Daily closes and sparse trades for two symbols.
pub mod market;
/// Tiny unindexed series for exercising alignment by hand.
pub mod series;
