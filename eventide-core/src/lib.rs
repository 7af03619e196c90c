//! eventide-core
//!
//! Data model, graph construction and dispatch machinery for the eventide
//! time-series engine.
//!
//! - `data`: index keys, per-key columns (`IndexData`) and the `EventSet` container.
//! - `normalize`: conversion of raw timestamps, feature arrays and index keys
//!   into the engine's canonical representation.
//! - `ingest`: building an `EventSet` from flat columns.
//! - `timeseries`: the per-key alignment engine and window helpers.
//! - `graph`: the node arena, operator kinds and schema inference.
//! - `operator` / `registry`: the implementation trait and the backend dispatch table.
//!
//! Nothing in this crate performs I/O, and evaluation itself lives in the
//! `eventide` crate.
#![warn(missing_docs)]

/// Index keys, per-key columns and the `EventSet` container.
pub mod data;
/// Graph arena, node kinds and schema inference.
pub mod graph;
/// Building event sets from flat columns.
pub mod ingest;
/// Canonicalization of raw timestamps, features and index keys.
pub mod normalize;
/// The trait implemented by executable operators.
pub mod operator;
/// Backend dispatch table for operator implementations.
pub mod registry;
/// Alignment and window algorithms over sorted timestamp sequences.
pub mod timeseries;

pub use data::{Column, EventSet, IndexData, IndexItem, IndexKey};
pub use eventide_types::*;
pub use graph::{
    ArithmeticOp, Graph, GraphDescription, MapContext, MapFunction, Node, NodeId, OperatorKind,
    Port, SamplingId, Socket,
};
pub use ingest::{IngestReport, event_set};
pub use operator::{OperatorImplementation, OperatorInputs, OperatorOutputs};
pub use registry::{ImplementationFactory, ImplementationRegistry};
pub use timeseries::sample::{SamplingIndices, build_sampling_indices};
