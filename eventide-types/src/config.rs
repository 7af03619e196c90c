//! Configuration types shared by the evaluator and its callers.

use serde::{Deserialize, Serialize};

use crate::BackendKey;

/// How the evaluator treats supplied inputs that the requested outputs never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum InputPolicy {
    /// Ignore unused inputs.
    #[default]
    Lenient,
    /// Reject unused inputs with `ExtraInput`.
    Strict,
}

/// Configuration for an `Evaluator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Backend whose implementations run the graph.
    pub backend: BackendKey,
    /// Treatment of supplied inputs that are not reachable from the outputs.
    pub input_policy: InputPolicy,
    /// Check that every produced event set carries the schema its node declared.
    pub verify_output_schemas: bool,
    /// Check, by comparing timestamps, that outputs declared to share a sampling
    /// with an input really do. Costs a pass over the data; meant for testing.
    pub verify_sampling: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKey::REFERENCE,
            input_policy: InputPolicy::Lenient,
            verify_output_schemas: true,
            verify_sampling: false,
        }
    }
}
