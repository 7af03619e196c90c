use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the eventide workspace.
///
/// Structural errors (types, schemas, graph wiring, registry misuse) are raised
/// while a graph is built; the remaining variants surface from `evaluate` and
/// abort the whole evaluation.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventideError {
    /// A value's storage type is outside the closed set of supported dtypes.
    #[error("unsupported type: {what}")]
    UnsupportedType {
        /// Description of the rejected type, e.g. "feature \"a\" with storage uint64".
        what: String,
    },

    /// A timestamp is NaN, unparseable, or below the minimum valid epoch.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Dtype, arity, length, or sampling mismatch against a schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The requested index key is not present in an event set.
    #[error("index key not found: {key}")]
    KeyNotFound {
        /// Rendered index key.
        key: String,
    },

    /// The graph walk revisited a node that is still on the walk stack.
    #[error("cycle detected at node {node}")]
    CycleDetected {
        /// Rendered node identifier where the cycle closed.
        node: String,
    },

    /// An input socket has no source and is not a graph input.
    #[error("unbound input socket {socket:?} on node {node}")]
    UnboundInput {
        /// Rendered node identifier.
        node: String,
        /// Socket name.
        socket: String,
    },

    /// No implementation is registered for the operator on the active backend.
    #[error("no implementation for operator {operator} on backend {backend}")]
    UnregisteredOperator {
        /// Operator tag.
        operator: String,
        /// Backend key.
        backend: String,
    },

    /// An implementation was registered twice for the same operator and backend.
    #[error("duplicate registration of operator {operator} on backend {backend}")]
    DuplicateRegistration {
        /// Operator tag.
        operator: String,
        /// Backend key.
        backend: String,
    },

    /// A graph input required by the requested outputs was not supplied.
    #[error("missing graph input: {name}")]
    MissingInput {
        /// Graph input name.
        name: String,
    },

    /// An input was supplied that the requested outputs never read (strict policy only).
    #[error("unused graph input: {name}")]
    ExtraInput {
        /// Graph input name.
        name: String,
    },

    /// A requested output name is not declared in the graph.
    #[error("unknown output: {name}")]
    UnknownOutput {
        /// Requested output name.
        name: String,
    },

    /// An elementwise function returned a value that cannot be stored in the column dtype.
    #[error("cannot coerce {value} to {dtype} in feature {feature:?}")]
    TypeCoercion {
        /// Rendered offending value.
        value: String,
        /// Target dtype.
        dtype: String,
        /// Feature name.
        feature: String,
    },

    /// A user-supplied function failed.
    #[error("function failed: {0}")]
    Function(String),

    /// Invalid operator parameter or argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An operator implementation failed during evaluation.
    #[error("{operator} implementation failed on node {node}: {msg}")]
    Implementation {
        /// Rendered node identifier.
        node: String,
        /// Operator tag.
        operator: String,
        /// Human-readable error message.
        msg: String,
    },
}

impl EventideError {
    /// Helper: build an `UnsupportedType` error from a description.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedType { what: what.into() }
    }

    /// Helper: build a `SchemaMismatch` error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Helper: build a `KeyNotFound` error for a rendered key.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Helper: build an `UnboundInput` error.
    pub fn unbound_input(node: impl Into<String>, socket: impl Into<String>) -> Self {
        Self::UnboundInput {
            node: node.into(),
            socket: socket.into(),
        }
    }

    /// Helper: build an `Implementation` error.
    pub fn implementation(
        node: impl Into<String>,
        operator: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Implementation {
            node: node.into(),
            operator: operator.into(),
            msg: msg.into(),
        }
    }

    /// Returns true for errors that are detectable before any data is touched.
    ///
    /// These come from type normalization, schema inference, graph wiring, or
    /// registry setup rather than from running an operator.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::SchemaMismatch(_)
                | Self::CycleDetected { .. }
                | Self::UnboundInput { .. }
                | Self::UnregisteredOperator { .. }
                | Self::DuplicateRegistration { .. }
                | Self::InvalidArg(_)
        )
    }
}
