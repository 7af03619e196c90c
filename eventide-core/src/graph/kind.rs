use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::data::IndexKey;
use crate::graph::{SamplingId, Socket};
use crate::{DType, EventideError, FeatureSchema, OperatorTag, Schema, Value};

/// Per-value context handed to a [`MapFunction::WithContext`] function.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    /// Index key of the partition being mapped.
    pub index_key: &'a IndexKey,
    /// Timestamp of the event being mapped.
    pub timestamp: f64,
    /// Name of the feature being mapped.
    pub feature_name: &'a str,
}

/// Signature of a value-only map function.
pub type ValueFn = dyn Fn(&Value) -> Result<Value, EventideError> + Send + Sync;

/// Signature of a map function that also receives the event's context.
pub type ContextFn =
    dyn Fn(&Value, &MapContext<'_>) -> Result<Value, EventideError> + Send + Sync;

/// Scalar function applied by a `Map` node, with its arity declared up front.
#[derive(Clone)]
pub enum MapFunction {
    /// Receives only the value.
    Value(Arc<ValueFn>),
    /// Receives the value and its [`MapContext`].
    WithContext(Arc<ContextFn>),
}

impl MapFunction {
    /// Wrap a value-only function.
    pub fn value<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, EventideError> + Send + Sync + 'static,
    {
        Self::Value(Arc::new(f))
    }

    /// Wrap a function that also receives the event's context.
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&Value, &MapContext<'_>) -> Result<Value, EventideError> + Send + Sync + 'static,
    {
        Self::WithContext(Arc::new(f))
    }

    /// Apply the function to one value.
    ///
    /// # Errors
    /// Whatever the wrapped function returns.
    pub fn call(&self, value: &Value, ctx: &MapContext<'_>) -> Result<Value, EventideError> {
        match self {
            Self::Value(f) => f(value),
            Self::WithContext(f) => f(value, ctx),
        }
    }

    /// `"value"` or `"with_context"`.
    #[must_use]
    pub const fn arity(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::WithContext(_) => "with_context",
        }
    }
}

impl fmt::Debug for MapFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapFunction::{}", self.arity())
    }
}

/// Pairwise arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    /// `left + right`
    Add,
    /// `left - right`
    Subtract,
    /// `left * right`
    Multiply,
    /// `left / right`, floats only
    Divide,
}

impl ArithmeticOp {
    /// Lower-case name, also used as the output feature prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator kind with its parameters.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum OperatorKind {
    /// Graph input bound to caller data at evaluation time.
    Source {
        /// Graph input name.
        name: String,
    },
    /// Last-known-value resampling of `input` onto the timestamps of `sampling`.
    Sample,
    /// Elementwise function over every feature value.
    Map(MapFunction),
    /// Pairwise arithmetic between the features of `left` and `right`.
    Arithmetic(ArithmeticOp),
    /// Keep the named features, in the given order.
    Select {
        /// Feature names to keep.
        features: Vec<String>,
    },
    /// Mean over the trailing window `(t - window, t]`.
    MovingAverage {
        /// Window length in seconds.
        window: f64,
    },
    /// Shift every timestamp by `duration` seconds.
    Lag {
        /// Shift in seconds; negative values move events earlier.
        duration: f64,
    },
}

const NO_INPUTS: &[&str] = &[];
const SINGLE_INPUT: &[&str] = &["input"];
const SAMPLE_INPUTS: &[&str] = &["input", "sampling"];
const BINARY_INPUTS: &[&str] = &["left", "right"];

impl OperatorKind {
    /// Registry tag of the kind.
    #[must_use]
    pub const fn tag(&self) -> OperatorTag {
        match self {
            Self::Source { .. } => OperatorTag::Source,
            Self::Sample => OperatorTag::Sample,
            Self::Map(_) => OperatorTag::Map,
            Self::Arithmetic(_) => OperatorTag::Arithmetic,
            Self::Select { .. } => OperatorTag::Select,
            Self::MovingAverage { .. } => OperatorTag::MovingAverage,
            Self::Lag { .. } => OperatorTag::Lag,
        }
    }

    /// Names of the input sockets the kind requires.
    #[must_use]
    pub const fn input_names(&self) -> &'static [&'static str] {
        match self {
            Self::Source { .. } => NO_INPUTS,
            Self::Sample => SAMPLE_INPUTS,
            Self::Arithmetic(_) => BINARY_INPUTS,
            Self::Map(_) | Self::Select { .. } | Self::MovingAverage { .. } | Self::Lag { .. } => {
                SINGLE_INPUT
            }
        }
    }

    /// Parameters as JSON, for graph introspection.
    #[must_use]
    pub fn params(&self) -> serde_json::Value {
        match self {
            Self::Source { name } => json!({ "name": name }),
            Self::Sample => json!({}),
            Self::Map(f) => json!({ "arity": f.arity() }),
            Self::Arithmetic(op) => json!({ "op": op }),
            Self::Select { features } => json!({ "features": features }),
            Self::MovingAverage { window } => json!({ "window": window }),
            Self::Lag { duration } => json!({ "duration": duration }),
        }
    }

    /// Infer the `output` socket from the bound input sockets.
    ///
    /// `fresh` is used when the operator creates a new sampling. Source
    /// nodes have no inputs and are typed by the graph, not here.
    ///
    /// # Errors
    /// - `SchemaMismatch` on any dtype, name, index or sampling disagreement.
    /// - `InvalidArg` on an out-of-range parameter.
    /// - `UnboundInput` if a required input is absent from `inputs`.
    pub fn infer_output(
        &self,
        inputs: &BTreeMap<String, Socket>,
        fresh: SamplingId,
    ) -> Result<Socket, EventideError> {
        let get = |name: &str| {
            inputs
                .get(name)
                .ok_or_else(|| EventideError::unbound_input(self.tag().as_str(), name))
        };
        match self {
            Self::Source { name } => Err(EventideError::InvalidArg(format!(
                "graph input {name:?} has no inputs to infer from"
            ))),
            Self::Sample => {
                let input = get("input")?;
                let sampling = get("sampling")?;
                ensure_same_index(&input.schema, &sampling.schema, "sample")?;
                Ok(Socket::new(Arc::clone(&input.schema), sampling.sampling))
            }
            Self::Map(_) => {
                let input = get("input")?;
                Ok(input.clone())
            }
            Self::Arithmetic(op) => {
                let left = get("left")?;
                let right = get("right")?;
                Ok(Socket::new(infer_arithmetic(*op, left, right)?, left.sampling))
            }
            Self::Select { features } => {
                let input = get("input")?;
                let picked = features
                    .iter()
                    .map(|name| {
                        input
                            .schema
                            .feature(name)
                            .map(|(_, f)| f.clone())
                            .ok_or_else(|| {
                                EventideError::schema_mismatch(format!(
                                    "select: no feature named {name:?}"
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Socket::new(input.schema.with_features(picked)?, input.sampling))
            }
            Self::MovingAverage { window } => {
                if !(window.is_finite() && *window > 0.0) {
                    return Err(EventideError::InvalidArg(format!(
                        "moving_average: window must be a positive number of seconds, got {window}"
                    )));
                }
                let input = get("input")?;
                let features = input
                    .schema
                    .features()
                    .iter()
                    .map(|f| {
                        if f.dtype.is_numeric() {
                            Ok(FeatureSchema::new(f.name.clone(), DType::Float64))
                        } else {
                            Err(EventideError::schema_mismatch(format!(
                                "moving_average: feature {:?} has non-numeric dtype {}",
                                f.name, f.dtype
                            )))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Socket::new(input.schema.with_features(features)?, input.sampling))
            }
            Self::Lag { duration } => {
                if !duration.is_finite() {
                    return Err(EventideError::InvalidArg(format!(
                        "lag: duration must be finite, got {duration}"
                    )));
                }
                let input = get("input")?;
                Ok(Socket::new(Arc::clone(&input.schema), fresh))
            }
        }
    }
}

fn ensure_same_index(a: &Schema, b: &Schema, op: &str) -> Result<(), EventideError> {
    if a.index() == b.index() {
        Ok(())
    } else {
        Err(EventideError::schema_mismatch(format!(
            "{op}: inputs have different index columns"
        )))
    }
}

fn infer_arithmetic(op: ArithmeticOp, left: &Socket, right: &Socket) -> Result<Schema, EventideError> {
    if left.sampling != right.sampling {
        return Err(EventideError::schema_mismatch(format!(
            "{op}: inputs must share a sampling; resample one onto the other first"
        )));
    }
    ensure_same_index(&left.schema, &right.schema, op.as_str())?;
    let (lf, rf) = (left.schema.features(), right.schema.features());
    if lf.len() != rf.len() {
        return Err(EventideError::schema_mismatch(format!(
            "{op}: left has {} features, right has {}",
            lf.len(),
            rf.len()
        )));
    }
    let mut out = Vec::with_capacity(lf.len());
    for (l, r) in lf.iter().zip(rf) {
        if l.dtype != r.dtype {
            return Err(EventideError::schema_mismatch(format!(
                "{op}: features {:?} ({}) and {:?} ({}) have different dtypes",
                l.name, l.dtype, r.name, r.dtype
            )));
        }
        if !l.dtype.is_numeric() {
            return Err(EventideError::schema_mismatch(format!(
                "{op}: feature {:?} has non-numeric dtype {}",
                l.name, l.dtype
            )));
        }
        if op == ArithmeticOp::Divide && !l.dtype.is_float() {
            return Err(EventideError::schema_mismatch(format!(
                "divide: feature {:?} has integer dtype {}; cast to a float dtype first",
                l.name, l.dtype
            )));
        }
        out.push(FeatureSchema::new(
            format!("{op}_{}_{}", l.name, r.name),
            l.dtype,
        ));
    }
    left.schema.with_features(out)
}
