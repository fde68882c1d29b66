//! The node contract and node addressing.
//!
//! A node is an opaque unit of per-tick computation. The graph owns its plugs
//! (see [`crate::plug`]); the node itself only implements [`Node`], reading
//! inputs and writing outputs through the context it is handed.
//!
//! Two identifiers exist for every node:
//!
//! - [`NodeId`]: the stable identity assigned by the graph description. Used by
//!   external code (editors, hosts, tests) to address nodes.
//! - [`NodeHandle`]: the dense arena index inside one runtime graph. Used for
//!   predecessor and trigger-target lists so they can never dangle.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{EvalContext, InitContext};
use crate::shared::SharedState;

/// Stable node identity from the graph description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Dense index of a node inside one runtime graph's arena.
///
/// Handles are assigned in insertion order and never reused within a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) u32);

impl NodeHandle {
    /// Returns the arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Routing record for one trigger link, stored on the node that fires.
///
/// When the owning node fires output `output`, the graph calls
/// [`Node::on_trigger`] on `receiver` for input `input`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerTarget {
    /// Node that receives the event.
    pub receiver: NodeHandle,
    /// Input socket on the receiver the link lands on.
    pub input: usize,
    /// Trigger output socket on the firing node.
    pub output: usize,
}

/// A trigger delivered to [`Node::on_trigger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Input socket on the receiving node.
    pub input: usize,
    /// Node that fired.
    pub source: NodeId,
    /// Output socket on the firing node.
    pub source_output: usize,
}

/// Free-form inspection text a node reports about itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSummary {
    lines: Vec<String>,
}

impl NodeSummary {
    /// Appends a `key: value` line.
    pub fn add(&mut self, key: &str, value: impl fmt::Display) {
        self.lines.push(format!("{key}: {value}"));
    }

    /// Appends an empty line.
    pub fn newline(&mut self) {
        self.lines.push(String::new());
    }

    /// All lines added so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The contract every node type implements.
///
/// The graph guarantees that `evaluate` runs at most once per tick and that
/// every predecessor has been evaluated (or is on a cycle and holds last
/// tick's output) before it runs. `evaluate` and `on_trigger` are never
/// called while the graph's shared-state lock is held.
pub trait Node: Send {
    /// Post-construction hook, called once after every link and literal of the
    /// graph is in place. The node may inspect its own wiring here.
    fn init(&mut self, _ctx: &mut InitContext<'_>) {}

    /// Per-tick update. Reads inputs and writes outputs through `ctx`.
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>);

    /// Handles a trigger arriving on one of this node's inputs.
    fn on_trigger(&mut self, _event: TriggerEvent, _ctx: &mut EvalContext<'_>) {}

    /// Teardown hook, called before the graph releases its nodes.
    fn shut(&mut self, _shared: &SharedState) {}

    /// Fills inspection text for debugging tools.
    fn describe(&self, _summary: &mut NodeSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }

    #[test]
    fn summary_lines() {
        let mut summary = NodeSummary::default();
        assert!(summary.is_empty());
        summary.add("value", 1.5);
        summary.newline();
        assert_eq!(summary.lines(), &["value: 1.5".to_string(), String::new()]);
    }
}
