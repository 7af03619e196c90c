//! Test support for eventide.
//!
//! - [`instrument`] installs a mock backend that forwards to an existing
//!   backend while counting calls and letting tests force results or failures.
//! - [`fixtures`] holds small deterministic event sets.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use eventide_core::operator::{OperatorImplementation, single_output};
use eventide_core::{
    BackendKey, EventSet, EventideError, ImplementationRegistry, Node, OperatorInputs,
    OperatorOutputs, OperatorTag,
};

pub mod fixtures;

/// Backend key used by [`instrument`] unless the caller picks another.
pub const MOCK_BACKEND: BackendKey = BackendKey::new("mock");

/// Instruction for how an operator should behave when invoked.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Run the delegate backend's implementation.
    Delegate,
    /// Return the provided event set on the `output` socket.
    Return(EventSet),
    /// Fail with the provided error.
    Fail(EventideError),
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<OperatorTag, MockBehavior>,
    log: Vec<(OperatorTag, String)>,
}

/// Controller handle used by tests to drive the mock backend from the outside.
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
    calls: Arc<AtomicUsize>,
}

impl MockController {
    fn lock(&self) -> std::sync::MutexGuard<'_, InternalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the behavior of every node with operator `tag`.
    pub fn set_behavior(&self, tag: OperatorTag, behavior: MockBehavior) {
        self.lock().rules.insert(tag, behavior);
    }

    /// Restore delegation for every operator and clear the call log.
    pub fn reset(&self) {
        let mut guard = self.lock();
        guard.rules.clear();
        guard.log.clear();
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Total implementation invocations since creation or the last reset.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Invocations of operator `tag`.
    #[must_use]
    pub fn calls(&self, tag: OperatorTag) -> usize {
        self.lock().log.iter().filter(|(t, _)| *t == tag).count()
    }

    /// Every invocation in order, as `(tag, node name)`; unnamed nodes log an empty name.
    #[must_use]
    pub fn log(&self) -> Vec<(OperatorTag, String)> {
        self.lock().log.clone()
    }

    fn behavior(&self, tag: OperatorTag) -> MockBehavior {
        self.lock()
            .rules
            .get(&tag)
            .cloned()
            .unwrap_or(MockBehavior::Delegate)
    }

    fn record(&self, tag: OperatorTag, name: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lock().log.push((tag, name.to_owned()));
    }
}

struct MockImplementation {
    tag: OperatorTag,
    name: String,
    delegate: Box<dyn OperatorImplementation>,
    controller: MockController,
}

impl OperatorImplementation for MockImplementation {
    fn call(&self, inputs: &OperatorInputs) -> Result<OperatorOutputs, EventideError> {
        self.controller.record(self.tag, &self.name);
        match self.controller.behavior(self.tag) {
            MockBehavior::Delegate => self.delegate.call(inputs),
            MockBehavior::Return(set) => Ok(single_output(set)),
            MockBehavior::Fail(e) => Err(e),
        }
    }
}

/// Register a mock implementation under `backend` in `target` for every
/// operator that `delegate` implements under `from`.
///
/// The mock resolves the real implementation when the node is dispatched,
/// so anything registered later in `delegate` is picked up as well.
///
/// # Errors
/// Returns `DuplicateRegistration` if `target` already has an
/// implementation for one of the operators under `backend`.
pub fn instrument(
    delegate: Arc<ImplementationRegistry>,
    from: BackendKey,
    target: &ImplementationRegistry,
    backend: BackendKey,
) -> Result<MockController, EventideError> {
    let controller = MockController {
        state: Arc::new(Mutex::new(InternalState::default())),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    for tag in delegate.operators(from) {
        let delegate = Arc::clone(&delegate);
        let controller = controller.clone();
        target.register(
            backend,
            tag,
            Arc::new(
                move |node: &Node| -> Result<Box<dyn OperatorImplementation>, EventideError> {
                    Ok(Box::new(MockImplementation {
                        tag,
                        name: node.name().unwrap_or_default().to_owned(),
                        delegate: delegate.resolve(from, node)?,
                        controller: controller.clone(),
                    }))
                },
            ),
        )?;
    }
    Ok(controller)
}
