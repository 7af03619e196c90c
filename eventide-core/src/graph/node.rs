use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Schema;
use crate::graph::OperatorKind;

/// Handle of a node inside a [`crate::Graph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Arena position.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a sampling: event sets produced on sockets with equal ids
/// hold the same index keys and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SamplingId(pub u64);

/// A typed output socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    /// Schema of the event set produced on this socket.
    pub schema: Arc<Schema>,
    /// Sampling of the event set produced on this socket.
    pub sampling: SamplingId,
}

impl Socket {
    /// Build a socket.
    pub fn new(schema: impl Into<Arc<Schema>>, sampling: SamplingId) -> Self {
        Self {
            schema: schema.into(),
            sampling,
        }
    }
}

/// Reference to a named output socket of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Port {
    /// Producing node.
    pub node: NodeId,
    /// Output socket name on that node.
    pub socket: String,
}

impl Port {
    /// Name of the single output socket every built-in operator exposes.
    pub const OUTPUT: &'static str = "output";

    /// Port on an explicitly named socket.
    pub fn new(node: NodeId, socket: impl Into<String>) -> Self {
        Self {
            node,
            socket: socket.into(),
        }
    }

    /// The default `output` socket of `node`.
    #[must_use]
    pub fn output(node: NodeId) -> Self {
        Self::new(node, Self::OUTPUT)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.socket)
    }
}

/// One operator instance.
///
/// Nodes are immutable once part of a graph; input sockets are bound to
/// other nodes' output ports and output sockets carry their inferred schema.
#[derive(Debug, Clone)]
pub struct Node {
    kind: OperatorKind,
    name: Option<String>,
    inputs: BTreeMap<String, Port>,
    outputs: BTreeMap<String, Socket>,
}

impl Node {
    /// Assemble a node from parts. Used to reconstruct graphs with [`crate::Graph::from_nodes`].
    #[must_use]
    pub const fn new(
        kind: OperatorKind,
        inputs: BTreeMap<String, Port>,
        outputs: BTreeMap<String, Socket>,
    ) -> Self {
        Self {
            kind,
            name: None,
            inputs,
            outputs,
        }
    }

    /// Same node with a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Operator kind and parameters.
    #[must_use]
    pub const fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    /// Optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Input socket bindings.
    #[must_use]
    pub const fn inputs(&self) -> &BTreeMap<String, Port> {
        &self.inputs
    }

    /// Output sockets.
    #[must_use]
    pub const fn outputs(&self) -> &BTreeMap<String, Socket> {
        &self.outputs
    }

    /// Output socket `name`.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.get(name)
    }
}
