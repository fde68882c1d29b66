//! Per-graph shared state: control values, memory banks, flags and graph events.
//!
//! Everything here sits behind one [`parking_lot::Mutex`] per graph instance.
//! Every accessor takes the lock for the duration of the call only, so nodes
//! may call them freely from `evaluate` and host threads may call them while
//! the graph ticks elsewhere. No accessor calls back into node code.

mod control;
mod events;
mod memory;

pub use control::{ControlKind, ControlValue, ControlValueRegistry, ControlValueSpec, Registration};
pub use events::GraphEvents;
pub use memory::{Memf, MemoryBanks};

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::error::GraphError;

#[derive(Debug, Default)]
struct SharedInner {
    controls: ControlValueRegistry,
    banks: MemoryBanks,
    flags: BTreeSet<String>,
    events: GraphEvents,
}

/// Lock-guarded services shared by every node of one graph.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: Mutex<SharedInner>,
}

/// Point-in-time copy of a graph's shared state, for inspection tooling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedSnapshot {
    /// Registered control values, sorted by name.
    pub control_values: Vec<ControlValue>,
    /// Numeric bank entries, sorted by name.
    pub numeric: Vec<(String, Memf)>,
    /// String bank entries, sorted by name.
    pub strings: Vec<(String, String)>,
    /// Set flags, sorted.
    pub flags: Vec<String>,
    /// Events active this tick.
    pub active_events: Vec<String>,
    /// Events queued for next tick.
    pub pending_events: Vec<String>,
    /// Registered event names, sorted.
    pub registered_events: Vec<String>,
}

impl SharedState {
    /// Creates empty shared state.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Memory banks ---

    /// Writes a numeric bank entry.
    pub fn set_numeric(&self, name: &str, value: Memf) {
        self.inner.lock().banks.set_numeric(name, value);
    }

    /// Reads a numeric bank entry; zeros if never written.
    pub fn get_numeric(&self, name: &str) -> Memf {
        self.inner.lock().banks.get_numeric(name)
    }

    /// Writes a string bank entry.
    pub fn set_string(&self, name: &str, value: &str) {
        self.inner.lock().banks.set_string(name, value);
    }

    /// Reads a string bank entry; empty if never written.
    pub fn get_string(&self, name: &str) -> String {
        self.inner.lock().banks.get_string(name)
    }

    // --- Control values ---

    /// Registers a control value, or adds a reference to an existing one.
    ///
    /// A newly inserted value is exported to the numeric bank immediately so
    /// it is readable by name before the next tick.
    pub fn register_control_value(&self, name: &str, spec: ControlValueSpec) -> Registration {
        let mut inner = self.inner.lock();
        let SharedInner {
            controls, banks, ..
        } = &mut *inner;
        let outcome = controls.register(name, spec);
        if outcome == Registration::Inserted {
            banks.set_numeric(name, [spec.default[0], spec.default[1], 0.0, 0.0]);
        }
        tracing::debug!(name, ?outcome, "control value registered");
        outcome
    }

    /// Drops one reference to a control value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownControlValue`] if `name` is not registered.
    /// The call is otherwise a no-op.
    pub fn unregister_control_value(&self, name: &str) -> Result<(), GraphError> {
        let remaining = self.inner.lock().controls.unregister(name);
        match remaining {
            Some(count) => {
                tracing::debug!(name, remaining = count, "control value unregistered");
                Ok(())
            }
            None => {
                tracing::warn!(name, "unregistering unknown control value");
                Err(GraphError::UnknownControlValue(name.to_string()))
            }
        }
    }

    /// Returns a copy of the named control value.
    pub fn find_control_value(&self, name: &str) -> Option<ControlValue> {
        self.inner.lock().controls.find(name).cloned()
    }

    /// Sets a control value's desired pair, clamped to its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownControlValue`] if `name` is not registered.
    pub fn set_control_value(&self, name: &str, x: f32, y: f32) -> Result<(), GraphError> {
        if self.inner.lock().controls.set_desired(name, x, y) {
            Ok(())
        } else {
            tracing::warn!(name, "setting unknown control value");
            Err(GraphError::UnknownControlValue(name.to_string()))
        }
    }

    // --- Flags ---

    /// Sets or clears a named flag.
    pub fn set_flag(&self, name: &str, value: bool) {
        let mut inner = self.inner.lock();
        if value {
            inner.flags.insert(name.to_string());
        } else {
            inner.flags.remove(name);
        }
    }

    /// Clears a named flag.
    pub fn reset_flag(&self, name: &str) {
        self.inner.lock().flags.remove(name);
    }

    /// Returns true if the named flag is set.
    pub fn is_flag_set(&self, name: &str) -> bool {
        self.inner.lock().flags.contains(name)
    }

    // --- Graph events ---

    /// Queues a graph-level event; it becomes active at the start of the next
    /// tick and stays active for that tick only.
    pub fn trigger_graph_event(&self, name: &str) {
        self.inner.lock().events.trigger(name);
        tracing::trace!(name, "graph event queued");
    }

    /// Registers interest in a graph event name.
    pub fn register_event(&self, name: &str) {
        let count = self.inner.lock().events.register(name);
        tracing::debug!(name, count, "graph event registered");
    }

    /// Drops one reference to a graph event name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEvent`] if `name` is not registered.
    pub fn unregister_event(&self, name: &str) -> Result<(), GraphError> {
        let remaining = self.inner.lock().events.unregister(name);
        match remaining {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(name, "unregistering unknown graph event");
                Err(GraphError::UnknownEvent(name.to_string()))
            }
        }
    }

    /// Returns true if `name` is active this tick.
    pub fn is_event_active(&self, name: &str) -> bool {
        self.inner.lock().events.is_active(name)
    }

    /// Events active this tick.
    pub fn active_events(&self) -> Vec<String> {
        self.inner.lock().events.active().to_vec()
    }

    // --- Tick bookkeeping ---

    /// Start-of-tick work, done under a single lock acquisition: promotes
    /// pending events, smooths control values by `dt` and exports them to the
    /// numeric bank.
    pub(crate) fn begin_tick(&self, dt: f32) {
        let mut inner = self.inner.lock();
        let SharedInner {
            controls,
            banks,
            events,
            ..
        } = &mut *inner;
        events.advance();
        controls.tick(dt);
        controls.export_to(banks);
    }

    /// Copies the whole state out for inspection.
    pub fn snapshot(&self) -> SharedSnapshot {
        let inner = self.inner.lock();
        SharedSnapshot {
            control_values: inner.controls.iter().cloned().collect(),
            numeric: inner.banks.numeric_entries(),
            strings: inner.banks.string_entries(),
            flags: inner.flags.iter().cloned().collect(),
            active_events: inner.events.active().to_vec(),
            pending_events: inner.events.pending().to_vec(),
            registered_events: inner.events.registered().map(str::to_string).collect(),
        }
    }
}
