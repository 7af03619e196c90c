use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    EventSet, EventideError, ImplementationRegistry, IndexData, Node, OperatorInputs,
    OperatorKind, OperatorOutputs, OperatorTag, Schema,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Keeps a subset of features in a chosen order.
#[derive(Debug)]
pub struct Select {
    features: Vec<String>,
    schema: Arc<Schema>,
}

impl OperatorImplementation for Select {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let input = inputs.input()?;
        let positions = self
            .features
            .iter()
            .map(|name| {
                input.schema().feature(name).map(|(i, _)| i).ok_or_else(|| {
                    EventideError::schema_mismatch(format!("select: no feature named {name:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, data) in input {
            let features = positions.iter().map(|&i| data.features()[i].clone()).collect();
            out.set(
                key.clone(),
                IndexData::new(Arc::clone(data.shared_timestamps()), features)?,
            )?;
        }
        Ok(single_output(out))
    }
}

fn build(node: &Node) -> Result<Box<dyn OperatorImplementation>, EventideError> {
    match node.kind() {
        OperatorKind::Select { features } => Ok(Box::new(Select {
            features: features.clone(),
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("select", node)),
    }
}

/// Register [`Select`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::Select, Arc::new(build))
}
