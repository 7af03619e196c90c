//! Portable implementations of the built-in operators.
//!
//! Every submodule exposes a `register` function that adds its operator to
//! a registry under [`BackendKey::REFERENCE`]; [`register_all`] registers
//! them all. Implementations loop over index keys one at a time and never
//! mix data across keys.

use std::sync::Arc;

use eventide_core::{BackendKey, EventideError, ImplementationRegistry, Node, Port, Schema};

/// Pairwise feature arithmetic.
pub mod arithmetic;
/// Lag.
pub mod lag;
/// Elementwise map.
pub mod map;
/// Trailing moving average.
pub mod moving_average;
/// Last-known-value sampling.
pub mod sample;
/// Feature projection.
pub mod select;

/// Backend key under which this module registers.
pub const BACKEND: BackendKey = BackendKey::REFERENCE;

/// Register every reference implementation.
///
/// # Errors
/// Returns `DuplicateRegistration` if any of them is already registered.
pub fn register_all(registry: &ImplementationRegistry) -> Result<(), EventideError> {
    sample::register(registry)?;
    map::register(registry)?;
    arithmetic::register(registry)?;
    select::register(registry)?;
    moving_average::register(registry)?;
    lag::register(registry)?;
    Ok(())
}

/// Schema declared on the node's `output` socket.
fn output_schema(node: &Node) -> Result<Arc<Schema>, EventideError> {
    node.output(Port::OUTPUT)
        .map(|s| Arc::clone(&s.schema))
        .ok_or_else(|| {
            EventideError::InvalidArg(format!(
                "{} node declares no {:?} socket",
                node.kind().tag(),
                Port::OUTPUT
            ))
        })
}

/// Error for a factory handed a node of another kind.
fn wrong_kind(expected: &str, node: &Node) -> EventideError {
    EventideError::InvalidArg(format!(
        "{expected} implementation cannot run a {} node",
        node.kind().tag()
    ))
}
