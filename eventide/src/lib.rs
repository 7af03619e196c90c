//! Eventide evaluates graphs of typed time-series operators.
//!
//! Overview
//! - Build a [`Graph`] of operator nodes over declared inputs. Schemas and
//!   samplings are inferred as nodes are added, so wiring mistakes surface
//!   before any data is touched.
//! - Bind concrete [`EventSet`]s to the graph inputs and ask an [`Evaluator`]
//!   for named outputs. Each reachable node runs exactly once per call, in
//!   dependency order, through the implementation registered for the active
//!   backend.
//! - The [`reference`] backend ships with the crate and registers itself in
//!   the process-wide default [`registry()`].
//!
//! Key behaviors and trade-offs
//! - Evaluation is synchronous and single-threaded; an implementation failure
//!   aborts the whole call and no partial outputs are returned.
//! - Alignment between samplings is explicit: operators that combine inputs
//!   require a shared sampling, and `sample` resamples with last-known-value
//!   semantics.
//! - Output schema and sampling checks are configurable through
//!   [`EvaluationConfig`]; schema checks are on by default, sampling checks
//!   (which compare timestamps) are off.
//!
//! Examples
//! ```
//! use eventide::{evaluate, Graph, MapFunction, Value, event_set};
//! use eventide::normalize::RawArray;
//!
//! let prices = event_set(
//!     RawArray::from(vec![0.0, 10.0, 20.0]),
//!     [("p", RawArray::from(vec![1i32, 2, 3]))],
//!     &[],
//!     None,
//! )?;
//!
//! let mut g = Graph::new();
//! let input = g.input("prices", prices.schema().clone())?;
//! let bumped = g.map(&input, MapFunction::value(|v| {
//!     Ok(Value::Float64(v.as_f64().unwrap_or(f64::NAN) + 1.0))
//! }))?;
//! g.output("bumped", &bumped)?;
//!
//! let out = evaluate(&g, [("prices", prices)], &["bumped"])?;
//! assert_eq!(out["bumped"].num_events(), 3);
//! # Ok::<(), eventide::EventideError>(())
//! ```
#![warn(missing_docs)]

mod evaluator;
/// Reference backend: portable implementations of every built-in operator.
pub mod reference;

use std::sync::{Arc, OnceLock};

pub use eventide_core::*;
pub use evaluator::{Evaluator, EvaluatorBuilder, Outputs};

static DEFAULT_REGISTRY: OnceLock<Arc<ImplementationRegistry>> = OnceLock::new();

/// The process-wide default registry, holding the [`reference`] backend.
///
/// Initialized on first use and shared afterwards. Callers that need other
/// backends build their own [`ImplementationRegistry`] and pass it to
/// [`EvaluatorBuilder::registry`].
pub fn registry() -> Arc<ImplementationRegistry> {
    Arc::clone(DEFAULT_REGISTRY.get_or_init(|| {
        let registry = ImplementationRegistry::new();
        let registered = reference::register_all(&registry);
        #[cfg(feature = "tracing")]
        if let Err(e) = &registered {
            tracing::warn!(error = %e, "default registry is missing reference implementations");
        }
        debug_assert!(
            registered.is_ok(),
            "reference implementations collide: {registered:?}"
        );
        Arc::new(registry)
    }))
}

/// Evaluate `outputs` of `graph` with the default registry and configuration.
///
/// # Errors
/// See [`Evaluator::evaluate`].
pub fn evaluate<S, E, I>(graph: &Graph, inputs: I, outputs: &[&str]) -> Result<Outputs, EventideError>
where
    S: Into<String>,
    E: Into<Arc<EventSet>>,
    I: IntoIterator<Item = (S, E)>,
{
    Evaluator::builder().build()?.evaluate(graph, inputs, outputs)
}
