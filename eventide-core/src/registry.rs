use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::graph::Node;
use crate::operator::OperatorImplementation;
use crate::{BackendKey, EventideError, OperatorTag};

/// Builds the implementation of one node for one backend.
pub type ImplementationFactory =
    Arc<dyn Fn(&Node) -> Result<Box<dyn OperatorImplementation>, EventideError> + Send + Sync>;

/// Table mapping `(backend, operator tag)` to an implementation factory.
///
/// Populated once at startup by each implementation module and read-only
/// afterwards. Lookups are exact: there is no fallback between backends.
///
/// ```
/// use std::sync::Arc;
/// use eventide_core::{BackendKey, EventideError, ImplementationRegistry, Node, OperatorTag};
/// use eventide_core::operator::OperatorImplementation;
///
/// fn unavailable(_node: &Node) -> Result<Box<dyn OperatorImplementation>, EventideError> {
///     Err(EventideError::InvalidArg("unused".into()))
/// }
///
/// let registry = ImplementationRegistry::new();
/// registry
///     .register(BackendKey::REFERENCE, OperatorTag::Lag, Arc::new(unavailable))
///     .unwrap();
/// assert!(registry.contains(BackendKey::REFERENCE, OperatorTag::Lag));
/// ```
#[derive(Default)]
pub struct ImplementationRegistry {
    factories: RwLock<HashMap<(BackendKey, OperatorTag), ImplementationFactory>>,
}

impl ImplementationRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for `(backend, tag)`.
    ///
    /// # Errors
    /// - `DuplicateRegistration` if the pair is already registered.
    /// - `InvalidArg` for tags that are never dispatched (graph inputs).
    pub fn register(
        &self,
        backend: BackendKey,
        tag: OperatorTag,
        factory: ImplementationFactory,
    ) -> Result<(), EventideError> {
        if !tag.is_dispatched() {
            return Err(EventideError::InvalidArg(format!(
                "operator {tag} is bound to caller data and takes no implementation"
            )));
        }
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        if factories.contains_key(&(backend, tag)) {
            return Err(EventideError::DuplicateRegistration {
                operator: tag.to_string(),
                backend: backend.to_string(),
            });
        }
        factories.insert((backend, tag), factory);
        Ok(())
    }

    /// Build the implementation of `node` on `backend`.
    ///
    /// # Errors
    /// - `UnregisteredOperator` if no factory exists for the pair.
    /// - Whatever the factory returns.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "eventide::registry::resolve",
            skip(self, node),
            fields(backend = %backend, operator = %node.kind().tag()),
        )
    )]
    pub fn resolve(
        &self,
        backend: BackendKey,
        node: &Node,
    ) -> Result<Box<dyn OperatorImplementation>, EventideError> {
        let tag = node.kind().tag();
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(backend, tag))
            .cloned()
            .ok_or_else(|| EventideError::UnregisteredOperator {
                operator: tag.to_string(),
                backend: backend.to_string(),
            })?;
        factory(node)
    }

    /// True if a factory exists for `(backend, tag)`.
    #[must_use]
    pub fn contains(&self, backend: BackendKey, tag: OperatorTag) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(backend, tag))
    }

    /// True if at least one factory is registered for `backend`.
    #[must_use]
    pub fn has_backend(&self, backend: BackendKey) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .any(|(b, _)| *b == backend)
    }

    /// Tags registered for `backend`, sorted.
    #[must_use]
    pub fn operators(&self, backend: BackendKey) -> Vec<OperatorTag> {
        let mut tags: Vec<_> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(b, _)| *b == backend)
            .map(|(_, t)| *t)
            .collect();
        tags.sort_unstable();
        tags
    }
}

impl core::fmt::Debug for ImplementationRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<_> = factories.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ImplementationRegistry")
            .field("registered", &keys)
            .finish()
    }
}
