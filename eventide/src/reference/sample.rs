use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    Column, EventSet, EventideError, ImplementationRegistry, IndexData, Node, OperatorInputs,
    OperatorKind, OperatorOutputs, OperatorTag, Schema, build_sampling_indices,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Resamples `input` onto the timestamps of `sampling`.
///
/// For every index key of `sampling`, each target timestamp takes the
/// feature values of the latest `input` event at or before it. Targets with
/// no earlier event, and keys absent from `input`, get missing values.
#[derive(Debug)]
pub struct Sample {
    schema: Arc<Schema>,
}

impl OperatorImplementation for Sample {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let input = inputs.get("input")?;
        let sampling = inputs.get("sampling")?;

        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, target) in sampling {
            let features = match input.try_get(key) {
                Some(source) => {
                    let indices = build_sampling_indices(source.timestamps(), target.timestamps());
                    source
                        .features()
                        .iter()
                        .map(|c| c.take(indices.positions()))
                        .collect()
                }
                None => self
                    .schema
                    .feature_dtypes()
                    .map(|dtype| Column::missing(dtype, target.len()))
                    .collect(),
            };
            out.set(
                key.clone(),
                IndexData::new(Arc::clone(target.shared_timestamps()), features)?,
            )?;
        }
        Ok(single_output(out))
    }
}

fn build(node: &Node) -> Result<Box<dyn OperatorImplementation>, EventideError> {
    match node.kind() {
        OperatorKind::Sample => Ok(Box::new(Sample {
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("sample", node)),
    }
}

/// Register [`Sample`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::Sample, Arc::new(build))
}
