use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    EventSet, EventideError, ImplementationRegistry, IndexData, Node, OperatorInputs,
    OperatorKind, OperatorOutputs, OperatorTag, Schema,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Shifts every timestamp by a fixed duration, leaving values untouched.
#[derive(Debug)]
pub struct Lag {
    duration: f64,
    schema: Arc<Schema>,
}

impl OperatorImplementation for Lag {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let input = inputs.input()?;
        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, data) in input {
            let shifted: Arc<[f64]> = data
                .timestamps()
                .iter()
                .map(|t| t + self.duration)
                .collect();
            out.set(key.clone(), IndexData::new(shifted, data.features().to_vec())?)?;
        }
        Ok(single_output(out))
    }
}

fn build(node: &Node) -> Result<Box<dyn OperatorImplementation>, EventideError> {
    match node.kind() {
        OperatorKind::Lag { duration } => Ok(Box::new(Lag {
            duration: *duration,
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("lag", node)),
    }
}

/// Register [`Lag`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::Lag, Arc::new(build))
}
