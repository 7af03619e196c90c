use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::timeseries::window;
use eventide_core::{
    Column, EventSet, EventideError, ImplementationRegistry, IndexData, Node, OperatorInputs,
    OperatorKind, OperatorOutputs, OperatorTag, Schema,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Trailing time-window mean of every numeric feature, as `FLOAT64`.
#[derive(Debug)]
pub struct MovingAverage {
    window: f64,
    schema: Arc<Schema>,
}

impl OperatorImplementation for MovingAverage {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let input = inputs.input()?;
        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, data) in input {
            let features = data
                .features()
                .iter()
                .zip(input.schema().features())
                .map(|(column, feature)| {
                    let values = column.to_f64().ok_or_else(|| {
                        EventideError::schema_mismatch(format!(
                            "moving_average: feature {:?} is not numeric",
                            feature.name
                        ))
                    })?;
                    Ok(Column::Float64(window::moving_average(
                        data.timestamps(),
                        &values,
                        self.window,
                    )))
                })
                .collect::<Result<Vec<_>, EventideError>>()?;
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
        OperatorKind::MovingAverage { window } => Ok(Box::new(MovingAverage {
            window: *window,
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("moving_average", node)),
    }
}

/// Register [`MovingAverage`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::MovingAverage, Arc::new(build))
}
