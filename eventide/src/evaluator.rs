use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use eventide_core::{
    EventSet, Graph, ImplementationRegistry, Node, NodeId, OperatorInputs, OperatorKind, Port,
    SamplingId,
};
use eventide_types::{BackendKey, EvaluationConfig, EventideError, InputPolicy};

/// Evaluated outputs keyed by graph output name.
pub type Outputs = BTreeMap<String, Arc<EventSet>>;

/// Runs graphs against concrete data through a registry backend.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<ImplementationRegistry>,
    cfg: EvaluationConfig,
}

/// Builder for constructing an [`Evaluator`] with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorBuilder {
    registry: Option<Arc<ImplementationRegistry>>,
    cfg: EvaluationConfig,
}

impl EvaluatorBuilder {
    /// Create a new builder with the default registry and configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` instead of the process-wide default.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ImplementationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: EvaluationConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Select the backend whose implementations run the graph.
    #[must_use]
    pub const fn backend(mut self, backend: BackendKey) -> Self {
        self.cfg.backend = backend;
        self
    }

    /// Set how unused inputs are treated.
    #[must_use]
    pub const fn input_policy(mut self, policy: InputPolicy) -> Self {
        self.cfg.input_policy = policy;
        self
    }

    /// Check every produced event set against its node's declared schema.
    #[must_use]
    pub const fn verify_output_schemas(mut self, yes: bool) -> Self {
        self.cfg.verify_output_schemas = yes;
        self
    }

    /// Check that event sets declared to share a sampling really do.
    ///
    /// Compares timestamps of every such pair, so it costs a pass over the data.
    #[must_use]
    pub const fn verify_sampling(mut self, yes: bool) -> Self {
        self.cfg.verify_sampling = yes;
        self
    }

    /// Build the evaluator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the registry has no implementation for the
    /// configured backend.
    pub fn build(self) -> Result<Evaluator, EventideError> {
        let registry = self.registry.unwrap_or_else(crate::registry);
        if !registry.has_backend(self.cfg.backend) {
            return Err(EventideError::InvalidArg(format!(
                "no operator implementations are registered for backend {}",
                self.cfg.backend
            )));
        }
        Ok(Evaluator {
            registry,
            cfg: self.cfg,
        })
    }
}

/// Attach the failing node to untyped implementation errors.
///
/// Errors that already describe a data or typing problem pass through
/// unchanged; anything else becomes `Implementation` naming the node and operator.
pub(crate) fn tag_err(node: &str, operator: &str, e: EventideError) -> EventideError {
    match e {
        e @ (EventideError::TypeCoercion { .. }
        | EventideError::SchemaMismatch(_)
        | EventideError::Function(_)
        | EventideError::UnregisteredOperator { .. }
        | EventideError::Implementation { .. }) => e,
        other => EventideError::implementation(node, operator, other.to_string()),
    }
}

impl Evaluator {
    /// Start building an evaluator.
    #[must_use]
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EvaluationConfig {
        &self.cfg
    }

    /// Evaluate the named `outputs` of `graph` with `inputs` bound by graph input name.
    ///
    /// Only the nodes reachable from `outputs` run, each exactly once, in
    /// dependency order. The required inputs are exactly the graph inputs
    /// reached.
    ///
    /// # Errors
    /// - `UnknownOutput` for an output name the graph does not declare.
    /// - `CycleDetected` / `UnboundInput` from planning.
    /// - `MissingInput` if a reached graph input is not supplied.
    /// - `ExtraInput` for a supplied input that is not reached, under the
    ///   strict input policy.
    /// - `SchemaMismatch` if a supplied event set's schema differs from the
    ///   declared input schema, or an output check fails.
    /// - `UnregisteredOperator` if the backend lacks a reached operator.
    /// - Any implementation error, tagged with the failing node. No partial
    ///   results are returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "eventide::evaluate",
            skip(self, graph, inputs),
            fields(backend = %self.cfg.backend, outputs = ?outputs),
        )
    )]
    pub fn evaluate<S, E, I>(
        &self,
        graph: &Graph,
        inputs: I,
        outputs: &[&str],
    ) -> Result<Outputs, EventideError>
    where
        S: Into<String>,
        E: Into<Arc<EventSet>>,
        I: IntoIterator<Item = (S, E)>,
    {
        let order = graph.plan_outputs(outputs)?;
        let mut supplied: HashMap<String, Arc<EventSet>> = inputs
            .into_iter()
            .map(|(name, set)| (name.into(), set.into()))
            .collect();

        let mut results: HashMap<Port, Arc<EventSet>> = HashMap::new();
        for &id in &order {
            if let OperatorKind::Source { name } = self.node(graph, id)?.kind() {
                let set = supplied
                    .remove(name)
                    .ok_or_else(|| EventideError::MissingInput { name: name.clone() })?;
                results.insert(Port::output(id), set);
            }
        }
        if let Some(extra) = supplied.keys().min() {
            match self.cfg.input_policy {
                InputPolicy::Strict => {
                    return Err(EventideError::ExtraInput {
                        name: extra.clone(),
                    });
                }
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(unused = ?supplied.keys().collect::<Vec<_>>(), "ignoring unused inputs");
                }
            }
        }

        let mut samplings: HashMap<SamplingId, Arc<EventSet>> = HashMap::new();
        for id in order {
            let node = self.node(graph, id)?;
            if let OperatorKind::Source { name } = node.kind() {
                let port = Port::output(id);
                let declared = graph.socket(&port)?;
                let set = results
                    .get(&port)
                    .ok_or_else(|| EventideError::MissingInput { name: name.clone() })?;
                if set.schema() != declared.schema.as_ref() {
                    return Err(EventideError::schema_mismatch(format!(
                        "input {name:?} does not match the schema declared in the graph"
                    )));
                }
                self.check_sampling(&mut samplings, declared.sampling, set, &graph.label(id))?;
                continue;
            }
            let produced = self.run_node(graph, id, &results)?;
            for (socket, set) in produced {
                let port = Port::new(id, socket);
                let declared = graph.socket(&port)?;
                self.check_sampling(&mut samplings, declared.sampling, &set, &graph.label(id))?;
                results.insert(port, set);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(results = results.len(), "evaluation finished");

        outputs
            .iter()
            .map(|&name| {
                let port = graph
                    .outputs()
                    .get(name)
                    .ok_or_else(|| EventideError::UnknownOutput {
                        name: name.to_owned(),
                    })?;
                let set = results.get(port).ok_or_else(|| {
                    EventideError::implementation(
                        graph.label(port.node),
                        "evaluate",
                        format!("output socket {:?} was never produced", port.socket),
                    )
                })?;
                Ok((name.to_owned(), Arc::clone(set)))
            })
            .collect()
    }

    fn node<'g>(&self, graph: &'g Graph, id: NodeId) -> Result<&'g Node, EventideError> {
        graph
            .node(id)
            .ok_or_else(|| EventideError::unbound_input(id.to_string(), Port::OUTPUT))
    }

    /// Invoke one node's implementation and check what it produced.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "eventide::evaluate::node",
            skip(self, graph, results),
            fields(node = %graph.label(id)),
        )
    )]
    fn run_node(
        &self,
        graph: &Graph,
        id: NodeId,
        results: &HashMap<Port, Arc<EventSet>>,
    ) -> Result<Vec<(String, Arc<EventSet>)>, EventideError> {
        let node = self.node(graph, id)?;
        let label = graph.label(id);
        let operator = node.kind().tag().as_str();

        let implementation = self
            .registry
            .resolve(self.cfg.backend, node)
            .map_err(|e| tag_err(&label, operator, e))?;

        let mut inputs = OperatorInputs::new();
        for (socket, port) in node.inputs() {
            let set = results
                .get(port)
                .ok_or_else(|| EventideError::unbound_input(&label, socket))?;
            inputs.insert(socket.clone(), Arc::clone(set));
        }

        let mut produced = implementation
            .call(&inputs)
            .map_err(|e| tag_err(&label, operator, e))?;

        let mut out = Vec::with_capacity(node.outputs().len());
        for (socket, declared) in node.outputs() {
            let set = produced.remove(socket).ok_or_else(|| {
                EventideError::implementation(
                    &label,
                    operator,
                    format!("no event set produced for output socket {socket:?}"),
                )
            })?;
            if self.cfg.verify_output_schemas && set.schema() != declared.schema.as_ref() {
                return Err(EventideError::schema_mismatch(format!(
                    "{label} produced schema {:?} on {socket:?}, declared {:?}",
                    set.schema(),
                    declared.schema
                )));
            }
            out.push((socket.clone(), Arc::new(set)));
        }
        Ok(out)
    }

    fn check_sampling(
        &self,
        seen: &mut HashMap<SamplingId, Arc<EventSet>>,
        sampling: SamplingId,
        set: &Arc<EventSet>,
        label: &str,
    ) -> Result<(), EventideError> {
        if !self.cfg.verify_sampling {
            return Ok(());
        }
        match seen.get(&sampling) {
            Some(first) if !first.same_sampling_as(set) => Err(EventideError::schema_mismatch(
                format!("{label} does not share the sampling it declares"),
            )),
            Some(_) => Ok(()),
            None => {
                seen.insert(sampling, Arc::clone(set));
                Ok(())
            }
        }
    }
}
