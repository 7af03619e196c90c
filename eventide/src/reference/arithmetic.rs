use std::sync::Arc;

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    ArithmeticOp, Column, EventSet, EventideError, ImplementationRegistry, IndexData, Node,
    OperatorInputs, OperatorKind, OperatorOutputs, OperatorTag, Schema,
};

use super::{BACKEND, output_schema, wrong_kind};

/// Combines the i-th feature of `left` with the i-th feature of `right`.
///
/// Both inputs share a sampling, so events pair up by position within each
/// index key. Integer arithmetic wraps on overflow.
#[derive(Debug)]
pub struct Arithmetic {
    op: ArithmeticOp,
    schema: Arc<Schema>,
}

impl Arithmetic {
    fn combine(&self, left: &Column, right: &Column) -> Result<Column, EventideError> {
        let op = self.op;
        let out = match (left, right) {
            (Column::Float64(l), Column::Float64(r)) => {
                Column::Float64(zip_with(l, r, |a, b| float_op(op, a, b)))
            }
            (Column::Float32(l), Column::Float32(r)) => {
                Column::Float32(zip_with(l, r, |a, b| float_op(op, a, b)))
            }
            (Column::Int64(l), Column::Int64(r)) => Column::Int64(zip_int(
                op,
                l,
                r,
                i64::wrapping_add,
                i64::wrapping_sub,
                i64::wrapping_mul,
            )?),
            (Column::Int32(l), Column::Int32(r)) => Column::Int32(zip_int(
                op,
                l,
                r,
                i32::wrapping_add,
                i32::wrapping_sub,
                i32::wrapping_mul,
            )?),
            (l, r) => {
                return Err(EventideError::schema_mismatch(format!(
                    "{op}: cannot combine {} with {}",
                    l.dtype(),
                    r.dtype()
                )));
            }
        };
        Ok(out)
    }
}

fn float_op<T>(op: ArithmeticOp, a: T, b: T) -> T
where
    T: core::ops::Add<Output = T>
        + core::ops::Sub<Output = T>
        + core::ops::Mul<Output = T>
        + core::ops::Div<Output = T>,
{
    match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide => a / b,
    }
}

fn zip_with<T: Copy>(l: &[T], r: &[T], f: impl Fn(T, T) -> T) -> Vec<T> {
    l.iter().zip(r).map(|(&a, &b)| f(a, b)).collect()
}

fn zip_int<T: Copy>(
    op: ArithmeticOp,
    l: &[T],
    r: &[T],
    add: fn(T, T) -> T,
    sub: fn(T, T) -> T,
    mul: fn(T, T) -> T,
) -> Result<Vec<T>, EventideError> {
    let f = match op {
        ArithmeticOp::Add => add,
        ArithmeticOp::Subtract => sub,
        ArithmeticOp::Multiply => mul,
        ArithmeticOp::Divide => {
            return Err(EventideError::schema_mismatch(
                "divide: integer features must be cast to a float dtype first",
            ));
        }
    };
    Ok(zip_with(l, r, f))
}

impl OperatorImplementation for Arithmetic {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        let left = inputs.get("left")?;
        let right = inputs.get("right")?;

        let mut out = EventSet::new(Arc::clone(&self.schema));
        for (key, l) in left {
            let r = right.get(key)?;
            if l.timestamps() != r.timestamps() {
                return Err(EventideError::schema_mismatch(format!(
                    "{}: inputs disagree on the timestamps of key {key}",
                    self.op
                )));
            }
            let features = l
                .features()
                .iter()
                .zip(r.features())
                .map(|(a, b)| self.combine(a, b))
                .collect::<Result<Vec<_>, _>>()?;
            out.set(
                key.clone(),
                IndexData::new(Arc::clone(l.shared_timestamps()), features)?,
            )?;
        }
        Ok(single_output(out))
    }
}

fn build(node: &Node) -> Result<Box<dyn OperatorImplementation>, EventideError> {
    match node.kind() {
        OperatorKind::Arithmetic(op) => Ok(Box::new(Arithmetic {
            op: *op,
            schema: output_schema(node)?,
        })),
        _ => Err(wrong_kind("arithmetic", node)),
    }
}

/// Register [`Arithmetic`] with the reference backend.
///
/// # Errors
/// Returns `DuplicateRegistration` if already registered.
pub fn register(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    registry.register(BACKEND, OperatorTag::Arithmetic, Arc::new(build))
}
