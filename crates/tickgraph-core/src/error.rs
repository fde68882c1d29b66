//! Error types for runtime graph operations.

use thiserror::Error;

use crate::node::NodeId;
use crate::value::PlugType;

/// Errors that can occur while wiring or using a runtime graph.
///
/// None of these abort a tick. Wiring errors are reported to the caller (the
/// graph builder turns them into diagnostics); usage errors on shared state are
/// logged and returned so callers can observe them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// No node with this identity exists in the graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// A node with this identity is already present.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    /// Input socket index past the node's inputs.
    #[error("{node} has no input socket {socket}")]
    InputOutOfRange {
        /// Node addressed.
        node: NodeId,
        /// Requested socket index.
        socket: usize,
    },

    /// Output socket index past the node's outputs.
    #[error("{node} has no output socket {socket}")]
    OutputOutOfRange {
        /// Node addressed.
        node: NodeId,
        /// Requested socket index.
        socket: usize,
    },

    /// An input can only read an output of its own type.
    #[error("cannot connect {output} output to {input} input")]
    TypeMismatch {
        /// Declared type of the input.
        input: PlugType,
        /// Declared type of the output.
        output: PlugType,
    },

    /// Literals are only attached to inputs that read nothing else.
    #[error("{node} input socket {socket} is already connected")]
    InputConnected {
        /// Node addressed.
        node: NodeId,
        /// Input socket index.
        socket: usize,
    },

    /// A literal's type must match the input it is attached to.
    #[error("literal of type {found} does not fit {expected} input")]
    LiteralTypeMismatch {
        /// Declared type of the input.
        expected: PlugType,
        /// Type of the offered literal.
        found: PlugType,
    },

    /// Unregistering a control value that is not registered.
    #[error("control value '{0}' is not registered")]
    UnknownControlValue(String),

    /// Unregistering a graph event that is not registered.
    #[error("graph event '{0}' is not registered")]
    UnknownEvent(String),

    /// A graph is already published as active on this thread.
    #[error("another graph is already active on this thread")]
    ActiveGraphNested,
}
