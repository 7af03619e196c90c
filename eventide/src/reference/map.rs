use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    Column, EventSet, EventideError, FeatureSchema, ImplementationRegistry, IndexData, IndexKey,
    MapContext, MapFunction, Node, OperatorInputs, OperatorKind, OperatorOutputs, OperatorTag,
    Schema,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Applies a scalar function to every feature value, keeping dtypes.
///
/// Results are coerced back to the feature's dtype; a result that cannot
/// be represented fails the whole call with `TypeCoercion`.
pub struct Map {
    f: MapFunction,
    schema: Arc<Schema>,
}

impl core::fmt::Debug for Map {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Map")
            .field("arity", &self.f.arity())
            .field("features", &self.schema.features().len())
            .finish()
    }
}

impl Map {
    fn map_column(
        &self,
        column: &Column,
        timestamps: &[f64],
        key: &IndexKey,
        feature: &FeatureSchema,
    ) -> Result<Column, EventideError> {
        let mut out = Column::with_capacity(feature.dtype, column.len());
        for (value, &timestamp) in column.values().zip(timestamps) {
            let ctx = MapContext {
                index_key: key,
                timestamp,
                feature_name: &feature.name,
            };
            let result = self.f.call(&value, &ctx)?;
            let coerced = result
                .coerce_to(feature.dtype)
                .ok_or_else(|| EventideError::TypeCoercion {
                    value: result.to_string(),
                    dtype: feature.dtype.to_string(),
                    feature: feature.name.clone(),
                })?;
            out.push(coerced).map_err(|v| EventideError::TypeCoercion {
                value: v.to_string(),
                dtype: feature.dtype.to_string(),
                feature: feature.name.clone(),
            })?;
        }
        Ok(out)
    }
}

impl OperatorImplementation for Map {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let input = inputs.input()?;
        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, data) in input {
            let features = data
                .features()
                .iter()
                .zip(self.schema.features())
                .map(|(column, feature)| self.map_column(column, data.timestamps(), key, feature))
                .collect::<Result<Vec<_>, _>>()?;
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
        OperatorKind::Map(f) => Ok(Box::new(Map {
            f: f.clone(),
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("map", node)),
    }
}

/// Register [`Map`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::Map, Arc::new(build))
}
