use std::collections::BTreeMap;
use std::sync::Arc;

use crate::graph::Port;
use crate::{EventSet, EventideError};

/// Event sets bound to a node's input sockets for one call.
#[derive(Debug, Clone, Default)]
pub struct OperatorInputs {
    sets: BTreeMap<String, Arc<EventSet>>,
}

impl OperatorInputs {
    /// Empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `set` to input socket `name`.
    pub fn insert(&mut self, name: impl Into<String>, set: Arc<EventSet>) {
        self.sets.insert(name.into(), set);
    }

    /// Event set bound to `name`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if nothing is bound to `name`.
    pub fn get(&self, name: &str) -> Result<&EventSet, EventideError> {
        self.sets
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| EventideError::InvalidArg(format!("no event set bound to input {name:?}")))
    }

    /// The event set bound to the conventional `input` socket.
    ///
    /// # Errors
    /// Returns `InvalidArg` if nothing is bound to `input`.
    pub fn input(&self) -> Result<&EventSet, EventideError> {
        self.get("input")
    }

    /// Iterate bindings in socket-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<EventSet>)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Arc<EventSet>)> for OperatorInputs {
    fn from_iter<T: IntoIterator<Item = (String, Arc<EventSet>)>>(iter: T) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

/// Event sets produced by one call, keyed by output socket name.
pub type OperatorOutputs = BTreeMap<String, EventSet>;

/// Wrap a single result as the conventional `output` socket.
#[must_use]
pub fn single_output(set: EventSet) -> OperatorOutputs {
    BTreeMap::from([(Port::OUTPUT.to_owned(), set)])
}

/// Executable operator for one backend.
///
/// Instances are built per node by an
/// [`ImplementationFactory`](crate::ImplementationFactory), so parameters such
/// as a map function or a window length are captured at construction. `call`
/// must not mutate its inputs and must return one event set per declared
/// output socket.
pub trait OperatorImplementation: Send + Sync {
    /// Run the operator on already-computed inputs.
    ///
    /// # Errors
    /// Any failure aborts the evaluation that issued the call.
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError>;
}

impl<F> OperatorImplementation for F
where
    F: Fn(&OperatorInputs) -> Result<OperatorOutputs, EventideError> + Send + Sync,
{
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        self(inputs)
    }
}
