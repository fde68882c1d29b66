//! The thread-local "currently active graph" handle.
//!
//! While a graph ticks, is being built, or tears down its nodes, it publishes
//! its shared state here so that code without a context at hand (node
//! construction, hot-reload helpers) can reach back into the graph. The handle
//! follows stack discipline: [`ActiveGraphGuard::enter`] sets it, dropping the
//! guard clears it. Publishing a second graph on the same thread while one is
//! active is an error.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::GraphError;
use crate::shared::SharedState;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<SharedState>>> = const { RefCell::new(None) };
}

/// Publishes a graph's shared state as active on this thread until dropped.
///
/// The guard is neither `Send` nor `Sync`; it must be dropped on the thread
/// that created it.
#[must_use = "the graph is only active while the guard is alive"]
pub struct ActiveGraphGuard {
    _not_send: PhantomData<*const ()>,
}

impl ActiveGraphGuard {
    /// Publishes `shared` as the active graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ActiveGraphNested`] if a graph is already active
    /// on this thread. The existing handle is left in place.
    pub fn enter(shared: Arc<SharedState>) -> Result<Self, GraphError> {
        ACTIVE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return Err(GraphError::ActiveGraphNested);
            }
            *slot = Some(shared);
            Ok(Self {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for ActiveGraphGuard {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

/// Returns true if a graph is active on this thread.
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Returns the active graph's shared state, if any.
pub fn active_shared() -> Option<Arc<SharedState>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Runs `f` against the active graph's shared state, if any.
pub fn with_active<R>(f: impl FnOnce(&SharedState) -> R) -> Option<R> {
    active_shared().map(|shared| f(&shared))
}
