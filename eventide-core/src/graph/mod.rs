//! Operator graphs.
//!
//! A [`Graph`] is an arena of [`Node`]s addressed by [`NodeId`]. Building a
//! graph never touches data: every node's output schema and sampling are
//! inferred when the node is added, and wiring or typing mistakes fail
//! immediately.

mod kind;
mod node;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use kind::{ArithmeticOp, ContextFn, MapContext, MapFunction, OperatorKind, ValueFn};
pub use node::{Node, NodeId, Port, SamplingId, Socket};

use crate::{EventideError, OperatorTag, Schema};

/// Arena of operator nodes plus named graph inputs and outputs.
///
/// ```
/// use eventide_core::{DType, FeatureSchema, Graph, Schema};
///
/// let mut g = Graph::new();
/// let prices = g.input("prices", Schema::unindexed(vec![FeatureSchema::new("p", DType::Float64)]).unwrap()).unwrap();
/// let avg = g.moving_average(&prices, 60.0).unwrap();
/// g.output("avg", &avg).unwrap();
/// let order = g.plan_outputs(&["avg"]).unwrap();
/// assert_eq!(order.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    inputs: BTreeMap<String, NodeId>,
    outputs: BTreeMap<String, Port>,
    next_sampling: u64,
}

impl Graph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_sampling(&mut self) -> SamplingId {
        let id = SamplingId(self.next_sampling);
        self.next_sampling += 1;
        id
    }

    /// Declare a graph input with its own sampling.
    ///
    /// # Errors
    /// Returns `InvalidArg` if an input with that name already exists.
    pub fn input(&mut self, name: impl Into<String>, schema: Schema) -> Result<Port, EventideError> {
        let sampling = self.fresh_sampling();
        self.push_source(name.into(), Socket::new(schema, sampling))
    }

    /// Declare a graph input that shares the sampling of `like`.
    ///
    /// The caller promises that the data bound to both carries identical
    /// index keys and timestamps.
    ///
    /// # Errors
    /// - `InvalidArg` if an input with that name already exists.
    /// - `UnboundInput` if `like` does not name an existing socket.
    /// - `SchemaMismatch` if the index columns differ from `like`'s.
    pub fn input_with_sampling(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
        like: &Port,
    ) -> Result<Port, EventideError> {
        let shared = self.socket(like)?;
        if shared.schema.index() != schema.index() {
            return Err(EventideError::schema_mismatch(
                "inputs sharing a sampling must have the same index columns",
            ));
        }
        let sampling = shared.sampling;
        self.push_source(name.into(), Socket::new(schema, sampling))
    }

    fn push_source(&mut self, name: String, socket: Socket) -> Result<Port, EventideError> {
        if self.inputs.contains_key(&name) {
            return Err(EventideError::InvalidArg(format!(
                "graph input {name:?} is declared twice"
            )));
        }
        let id = NodeId(self.nodes.len());
        let outputs = BTreeMap::from([(Port::OUTPUT.to_owned(), socket)]);
        self.nodes.push(Node::new(
            OperatorKind::Source { name: name.clone() },
            BTreeMap::new(),
            outputs,
        ));
        self.inputs.insert(name, id);
        Ok(Port::output(id))
    }

    /// Add an operator node with its input bindings and return its handle.
    ///
    /// # Errors
    /// - `UnboundInput` if a required input socket is not bound, or is bound
    ///   to a port that does not exist.
    /// - `InvalidArg` for source kinds (use [`Graph::input`]) and bad parameters.
    /// - `SchemaMismatch` when the inputs do not type-check for the operator.
    pub fn add_node<'a, I>(&mut self, kind: OperatorKind, bindings: I) -> Result<NodeId, EventideError>
    where
        I: IntoIterator<Item = (&'a str, &'a Port)>,
    {
        let id = NodeId(self.nodes.len());
        let label = format!("{}{id}", kind.tag());
        let mut inputs = BTreeMap::new();
        let mut sockets = BTreeMap::new();
        for (name, port) in bindings {
            let socket = self
                .socket(port)
                .map_err(|_| EventideError::unbound_input(&label, name))?;
            sockets.insert(name.to_owned(), socket.clone());
            inputs.insert(name.to_owned(), port.clone());
        }
        if let Some(missing) = kind.input_names().iter().find(|n| !inputs.contains_key(**n)) {
            return Err(EventideError::unbound_input(label, *missing));
        }
        if let Some(extra) = inputs
            .keys()
            .find(|n| !kind.input_names().iter().any(|k| *k == n.as_str()))
        {
            return Err(EventideError::InvalidArg(format!(
                "{label}: unexpected input socket {extra:?}"
            )));
        }
        let fresh = self.fresh_sampling();
        let output = kind.infer_output(&sockets, fresh)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %label, sampling = output.sampling.0, "added node");
        self.nodes.push(Node::new(
            kind,
            inputs,
            BTreeMap::from([(Port::OUTPUT.to_owned(), output)]),
        ));
        Ok(id)
    }

    fn add_unary(&mut self, kind: OperatorKind, input: &Port) -> Result<Port, EventideError> {
        self.add_node(kind, [("input", input)]).map(Port::output)
    }

    /// Resample `input` onto the sampling of `sampling` with last-known-value semantics.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn sample(&mut self, input: &Port, sampling: &Port) -> Result<Port, EventideError> {
        self.add_node(OperatorKind::Sample, [("input", input), ("sampling", sampling)])
            .map(Port::output)
    }

    /// Apply `f` to every feature value of `input`.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn map(&mut self, input: &Port, f: MapFunction) -> Result<Port, EventideError> {
        self.add_unary(OperatorKind::Map(f), input)
    }

    /// Pairwise arithmetic between two inputs sharing a sampling.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn arithmetic(
        &mut self,
        op: ArithmeticOp,
        left: &Port,
        right: &Port,
    ) -> Result<Port, EventideError> {
        self.add_node(OperatorKind::Arithmetic(op), [("left", left), ("right", right)])
            .map(Port::output)
    }

    /// `left + right`, feature by feature.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn add(&mut self, left: &Port, right: &Port) -> Result<Port, EventideError> {
        self.arithmetic(ArithmeticOp::Add, left, right)
    }

    /// `left - right`, feature by feature.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn subtract(&mut self, left: &Port, right: &Port) -> Result<Port, EventideError> {
        self.arithmetic(ArithmeticOp::Subtract, left, right)
    }

    /// `left * right`, feature by feature.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn multiply(&mut self, left: &Port, right: &Port) -> Result<Port, EventideError> {
        self.arithmetic(ArithmeticOp::Multiply, left, right)
    }

    /// `left / right`, feature by feature; float features only.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn divide(&mut self, left: &Port, right: &Port) -> Result<Port, EventideError> {
        self.arithmetic(ArithmeticOp::Divide, left, right)
    }

    /// Keep the named features of `input`, in the given order.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn select(&mut self, input: &Port, features: &[&str]) -> Result<Port, EventideError> {
        let features = features.iter().map(|&f| f.to_owned()).collect();
        self.add_unary(OperatorKind::Select { features }, input)
    }

    /// Trailing moving average over `window` seconds.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn moving_average(&mut self, input: &Port, window: f64) -> Result<Port, EventideError> {
        self.add_unary(OperatorKind::MovingAverage { window }, input)
    }

    /// Shift the timestamps of `input` by `duration` seconds.
    ///
    /// # Errors
    /// See [`Graph::add_node`].
    pub fn lag(&mut self, input: &Port, duration: f64) -> Result<Port, EventideError> {
        self.add_unary(OperatorKind::Lag { duration }, input)
    }

    /// Declare a named graph output.
    ///
    /// # Errors
    /// - `UnboundInput` if `port` does not name an existing socket.
    /// - `InvalidArg` if the output name is already declared.
    pub fn output(&mut self, name: impl Into<String>, port: &Port) -> Result<(), EventideError> {
        let name = name.into();
        self.socket(port)?;
        if self.outputs.contains_key(&name) {
            return Err(EventideError::InvalidArg(format!(
                "graph output {name:?} is declared twice"
            )));
        }
        self.outputs.insert(name, port.clone());
        Ok(())
    }

    /// Attach a display name to a node.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unknown node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), EventideError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| EventideError::InvalidArg(format!("no node {id}")))?;
        node.set_name(name.into());
        Ok(())
    }

    /// Node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// All nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Named graph inputs.
    #[must_use]
    pub const fn inputs(&self) -> &BTreeMap<String, NodeId> {
        &self.inputs
    }

    /// Named graph outputs.
    #[must_use]
    pub const fn outputs(&self) -> &BTreeMap<String, Port> {
        &self.outputs
    }

    /// Human-readable label for errors and logs: the node's name, or its tag and handle.
    #[must_use]
    pub fn label(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(n) => n
                .name()
                .map_or_else(|| format!("{}{id}", n.kind().tag()), str::to_owned),
            None => id.to_string(),
        }
    }

    /// Output socket addressed by `port`.
    ///
    /// # Errors
    /// Returns `UnboundInput` if the node or socket does not exist.
    pub fn socket(&self, port: &Port) -> Result<&Socket, EventideError> {
        self.node(port.node)
            .and_then(|n| n.output(&port.socket))
            .ok_or_else(|| EventideError::unbound_input(port.node.to_string(), &port.socket))
    }

    /// Schema produced on `port`.
    ///
    /// # Errors
    /// Returns `UnboundInput` if the node or socket does not exist.
    pub fn schema(&self, port: &Port) -> Result<&Arc<Schema>, EventideError> {
        self.socket(port).map(|s| &s.schema)
    }

    /// Topological order of the nodes reachable from the named outputs.
    ///
    /// # Errors
    /// `UnknownOutput` for an undeclared name, plus the errors of [`Graph::plan`].
    pub fn plan_outputs(&self, names: &[&str]) -> Result<Vec<NodeId>, EventideError> {
        let ports = names
            .iter()
            .map(|&n| {
                self.outputs
                    .get(n)
                    .cloned()
                    .ok_or_else(|| EventideError::UnknownOutput { name: n.to_owned() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.plan(&ports)
    }

    /// Topological order (producers first) of the nodes reachable from `outputs`.
    ///
    /// Every node appears once regardless of fan-out.
    ///
    /// # Errors
    /// - `CycleDetected` if the walk reaches a node still on its stack.
    /// - `UnboundInput` if a reached socket is unbound or dangling.
    pub fn plan(&self, outputs: &[Port]) -> Result<Vec<NodeId>, EventideError> {
        let mut marks = HashMap::new();
        let mut order = Vec::new();
        for port in outputs {
            self.socket(port)?;
            self.visit(port.node, &mut marks, &mut order)?;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(nodes = order.len(), "planned graph walk");
        Ok(order)
    }

    /// Depth-first post-order walk from `root` with an explicit stack.
    fn visit(
        &self,
        root: NodeId,
        marks: &mut HashMap<NodeId, Mark>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), EventideError> {
        if matches!(marks.get(&root), Some(Mark::Done)) {
            return Ok(());
        }
        // Each frame is a node on the walk and the next input socket to follow.
        let mut stack = vec![(root, 0usize)];
        while let Some(&(id, next)) = stack.last() {
            let node = self
                .node(id)
                .ok_or_else(|| EventideError::unbound_input(id.to_string(), Port::OUTPUT))?;
            if next == 0 {
                marks.insert(id, Mark::OnStack);
            }
            let Some(required) = node.kind().input_names().get(next) else {
                marks.insert(id, Mark::Done);
                order.push(id);
                stack.pop();
                continue;
            };
            let top = stack.len() - 1;
            stack[top].1 += 1;

            let port = node
                .inputs()
                .get(*required)
                .ok_or_else(|| EventideError::unbound_input(self.label(id), *required))?;
            if self.socket(port).is_err() {
                return Err(EventideError::unbound_input(self.label(id), *required));
            }
            match marks.get(&port.node) {
                Some(Mark::Done) => {}
                Some(Mark::OnStack) => {
                    return Err(EventideError::CycleDetected {
                        node: self.label(port.node),
                    });
                }
                None => stack.push((port.node, 0)),
            }
        }
        Ok(())
    }

    /// Rebuild a graph from raw nodes and named outputs, e.g. ones produced
    /// by a deserializer.
    ///
    /// Handles are positions in `nodes`. Source nodes become named graph
    /// inputs. Every other node is re-typed from its inputs and must declare
    /// the schema and sampling its operator infers. Sources and lags
    /// introduce samplings, so no two of them may declare the same id.
    ///
    /// # Errors
    /// - `InvalidArg` for duplicate graph input names.
    /// - `UnboundInput` for missing or dangling input bindings or output ports.
    /// - `CycleDetected` if the nodes form a cycle.
    /// - `SchemaMismatch` if a declared output schema or sampling differs from
    ///   the inferred one.
    pub fn from_nodes(
        nodes: Vec<Node>,
        outputs: BTreeMap<String, Port>,
    ) -> Result<Self, EventideError> {
        let next_sampling = nodes
            .iter()
            .flat_map(|n| n.outputs().values())
            .map(|s| s.sampling.0 + 1)
            .max()
            .unwrap_or(0);
        let mut graph = Self {
            nodes,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            next_sampling,
        };

        for (i, node) in graph.nodes.iter().enumerate() {
            if let OperatorKind::Source { name } = node.kind()
                && graph.inputs.insert(name.clone(), NodeId(i)).is_some()
            {
                return Err(EventideError::InvalidArg(format!(
                    "graph input {name:?} is declared twice"
                )));
            }
        }

        let all: Vec<Port> = (0..graph.nodes.len())
            .flat_map(|i| {
                graph.nodes[i]
                    .outputs()
                    .keys()
                    .map(move |s| Port::new(NodeId(i), s.clone()))
            })
            .collect();
        let order = graph.plan(&all)?;

        let mut introduced: HashMap<SamplingId, NodeId> = HashMap::new();

        for id in order {
            let node = &graph.nodes[id.0];
            let declared = node.output(Port::OUTPUT).ok_or_else(|| {
                EventideError::schema_mismatch(format!(
                    "{} declares no {:?} socket",
                    graph.label(id),
                    Port::OUTPUT
                ))
            })?;
            let introduces_sampling = matches!(
                node.kind(),
                OperatorKind::Source { .. } | OperatorKind::Lag { .. }
            );
            if introduces_sampling
                && let Some(other) = introduced.insert(declared.sampling, id)
            {
                return Err(EventideError::schema_mismatch(format!(
                    "{} must introduce a new sampling but reuses sampling {} of {}",
                    graph.label(id),
                    declared.sampling.0,
                    graph.label(other)
                )));
            }
            if node.kind().tag() == OperatorTag::Source {
                continue;
            }

            let sockets = node
                .inputs()
                .iter()
                .map(|(name, port)| Ok((name.clone(), graph.socket(port)?.clone())))
                .collect::<Result<BTreeMap<_, _>, EventideError>>()?;
            let inferred = node.kind().infer_output(&sockets, SamplingId(next_sampling))?;
            if declared.schema != inferred.schema {
                return Err(EventideError::schema_mismatch(format!(
                    "{} declares an output schema that differs from the inferred one",
                    graph.label(id)
                )));
            }
            if !introduces_sampling && declared.sampling != inferred.sampling {
                return Err(EventideError::schema_mismatch(format!(
                    "{} declares sampling {} but its inputs give sampling {}",
                    graph.label(id),
                    declared.sampling.0,
                    inferred.sampling.0
                )));
            }
        }

        for (name, port) in outputs {
            graph.output(name, &port)?;
        }
        Ok(graph)
    }

    /// Structural description of the graph for external serializers.
    #[must_use]
    pub fn describe(&self) -> GraphDescription {
        GraphDescription {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| NodeDescription {
                    id: NodeId(i),
                    operator: n.kind().tag(),
                    name: n.name().map(str::to_owned),
                    params: n.kind().params(),
                    inputs: n.inputs().clone(),
                    outputs: n.outputs().clone(),
                })
                .collect(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    OnStack,
    Done,
}

/// Serializable structure of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Nodes in arena order.
    pub nodes: Vec<NodeDescription>,
    /// Graph input names and their source nodes.
    pub inputs: BTreeMap<String, NodeId>,
    /// Graph output names and the ports they read.
    pub outputs: BTreeMap<String, Port>,
}

/// Serializable structure of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Arena handle.
    pub id: NodeId,
    /// Operator tag.
    pub operator: OperatorTag,
    /// Display name, if set.
    pub name: Option<String>,
    /// Operator parameters.
    pub params: serde_json::Value,
    /// Input socket bindings.
    pub inputs: BTreeMap<String, Port>,
    /// Output sockets with schema and sampling.
    pub outputs: BTreeMap<String, Socket>,
}
