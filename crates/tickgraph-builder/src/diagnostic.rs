//! Build failures and recoverable construction diagnostics.

use thiserror::Error;
use tickgraph_core::{GraphError, NodeId, PlugType};

/// Which side of a node a socket index addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketSide {
    /// Input socket.
    Input,
    /// Output socket.
    Output,
}

impl core::fmt::Display for SocketSide {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SocketSide::Input => f.write_str("input"),
            SocketSide::Output => f.write_str("output"),
        }
    }
}

/// A build that could not produce a graph at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Another graph is already published as active on this thread.
    #[error("cannot build while another graph is active on this thread")]
    ActiveGraphNested,
}

/// A construction problem that was recovered from by dropping the offending
/// node, link or literal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildDiagnostic {
    /// The node's type is not in the registry; the node is not created.
    #[error("node {node}: unknown type '{type_name}'")]
    UnknownType {
        /// Node entry.
        node: NodeId,
        /// Requested type name.
        type_name: String,
    },

    /// A second node entry reused an identity; the first entry wins.
    #[error("node {node}: duplicate id, entry ignored")]
    DuplicateNode {
        /// Repeated identity.
        node: NodeId,
    },

    /// A link names a node that is not in the graph.
    #[error("link {link}: endpoint {node} does not exist")]
    MissingEndpoint {
        /// Link entry.
        link: u32,
        /// Missing node.
        node: NodeId,
    },

    /// A link names a socket index the node does not have.
    #[error("link {link}: {node} has no {side} socket {socket}")]
    MissingSocket {
        /// Link entry.
        link: u32,
        /// Node addressed.
        node: NodeId,
        /// Requested index.
        socket: usize,
        /// Side of the node.
        side: SocketSide,
    },

    /// A link joins sockets of different kinds.
    #[error("link {link}: cannot connect {output} output to {input} input")]
    TypeMismatch {
        /// Link entry.
        link: u32,
        /// Input kind on the consuming node.
        input: PlugType,
        /// Output kind on the producing node.
        output: PlugType,
    },

    /// A later link fed an input that an earlier link already fed; the later
    /// link replaced the earlier one.
    #[error("link {link}: {node} input socket {socket} was already linked, earlier link replaced")]
    InputRelinked {
        /// Link entry that won.
        link: u32,
        /// Consuming node.
        node: NodeId,
        /// Input socket index.
        socket: usize,
    },

    /// The graph refused a link for another reason.
    #[error("link {link}: {error}")]
    LinkRejected {
        /// Link entry.
        link: u32,
        /// Reason given by the graph.
        error: GraphError,
    },

    /// A node entry gives a value for an input its type does not declare.
    #[error("node {node}: type has no input named '{input}'")]
    UnknownInput {
        /// Node entry.
        node: NodeId,
        /// Input name from the description.
        input: String,
    },

    /// The input's kind cannot hold a literal; no literal is attached.
    #[error("node {node}: input '{input}' of type {plug_type} cannot take a literal")]
    UnsupportedLiteral {
        /// Node entry.
        node: NodeId,
        /// Input name.
        input: String,
        /// Declared kind of the input.
        plug_type: PlugType,
    },

    /// The literal text did not parse; the zero value of the kind was
    /// attached instead.
    #[error("node {node}: input '{input}' has malformed {plug_type} literal '{text}'")]
    MalformedLiteral {
        /// Node entry.
        node: NodeId,
        /// Input name.
        input: String,
        /// Declared kind of the input.
        plug_type: PlugType,
        /// Text from the description.
        text: String,
    },

    /// These nodes lie on a link cycle. Cycle edges read the value from the
    /// previous tick.
    #[error("nodes on a cycle: {}", .nodes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Cycle {
        /// Nodes on or between cycles, sorted.
        nodes: Vec<NodeId>,
    },
}

impl BuildDiagnostic {
    /// Maps a refused connection onto a link diagnostic.
    pub(crate) fn from_link_error(link: u32, error: GraphError) -> Self {
        match error {
            GraphError::NodeNotFound(node) => BuildDiagnostic::MissingEndpoint { link, node },
            GraphError::InputOutOfRange { node, socket } => BuildDiagnostic::MissingSocket {
                link,
                node,
                socket,
                side: SocketSide::Input,
            },
            GraphError::OutputOutOfRange { node, socket } => BuildDiagnostic::MissingSocket {
                link,
                node,
                socket,
                side: SocketSide::Output,
            },
            GraphError::TypeMismatch { input, output } => {
                BuildDiagnostic::TypeMismatch { link, input, output }
            }
            error => BuildDiagnostic::LinkRejected { link, error },
        }
    }

    /// Node the problem is attached to, if it concerns a single node.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            BuildDiagnostic::UnknownType { node, .. }
            | BuildDiagnostic::DuplicateNode { node }
            | BuildDiagnostic::MissingEndpoint { node, .. }
            | BuildDiagnostic::MissingSocket { node, .. }
            | BuildDiagnostic::InputRelinked { node, .. }
            | BuildDiagnostic::UnknownInput { node, .. }
            | BuildDiagnostic::UnsupportedLiteral { node, .. }
            | BuildDiagnostic::MalformedLiteral { node, .. } => Some(*node),
            BuildDiagnostic::TypeMismatch { .. }
            | BuildDiagnostic::LinkRejected { .. }
            | BuildDiagnostic::Cycle { .. } => None,
        }
    }

    /// Link the problem is attached to, if any.
    pub fn link(&self) -> Option<u32> {
        match self {
            BuildDiagnostic::MissingEndpoint { link, .. }
            | BuildDiagnostic::MissingSocket { link, .. }
            | BuildDiagnostic::TypeMismatch { link, .. }
            | BuildDiagnostic::InputRelinked { link, .. }
            | BuildDiagnostic::LinkRejected { link, .. } => Some(*link),
            _ => None,
        }
    }

    /// True if something from the description was dropped or altered. A
    /// cycle report alone leaves the graph as described.
    pub fn is_loss(&self) -> bool {
        !matches!(self, BuildDiagnostic::Cycle { .. })
    }

    /// Emits the diagnostic through `tracing`.
    pub(crate) fn report(&self) {
        match self {
            BuildDiagnostic::UnknownType { node, type_name } => {
                tracing::warn!(node_id = node.index(), type_name = %type_name, "unknown node type");
            }
            BuildDiagnostic::DuplicateNode { node } => {
                tracing::warn!(node_id = node.index(), "duplicate node id");
            }
            BuildDiagnostic::MissingEndpoint { link, node } => {
                tracing::warn!(link_id = link, node_id = node.index(), "link endpoint missing");
            }
            BuildDiagnostic::MissingSocket {
                link,
                node,
                socket,
                side,
            } => {
                tracing::warn!(
                    link_id = link,
                    node_id = node.index(),
                    socket,
                    side = %side,
                    "link socket missing"
                );
            }
            BuildDiagnostic::TypeMismatch {
                link,
                input,
                output,
            } => {
                tracing::warn!(link_id = link, input = %input, output = %output, "link type mismatch");
            }
            BuildDiagnostic::InputRelinked { link, node, socket } => {
                tracing::warn!(
                    link_id = link,
                    node_id = node.index(),
                    socket,
                    "input linked twice, earlier link replaced"
                );
            }
            BuildDiagnostic::LinkRejected { link, error } => {
                tracing::warn!(link_id = link, %error, "link rejected");
            }
            BuildDiagnostic::UnknownInput { node, input } => {
                tracing::warn!(node_id = node.index(), socket = %input, "unknown input name");
            }
            BuildDiagnostic::UnsupportedLiteral {
                node,
                input,
                plug_type,
            } => {
                tracing::warn!(
                    node_id = node.index(),
                    socket = %input,
                    plug_type = %plug_type,
                    "input kind cannot take a literal"
                );
            }
            BuildDiagnostic::MalformedLiteral {
                node,
                input,
                plug_type,
                text,
            } => {
                tracing::warn!(
                    node_id = node.index(),
                    socket = %input,
                    plug_type = %plug_type,
                    text = %text,
                    "malformed literal, using zero"
                );
            }
            BuildDiagnostic::Cycle { nodes } => {
                tracing::info!(?nodes, "graph contains cycles; cycle edges read last tick's values");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_errors_map_to_link_diagnostics() {
        assert_eq!(
            BuildDiagnostic::from_link_error(4, GraphError::NodeNotFound(NodeId(9))),
            BuildDiagnostic::MissingEndpoint {
                link: 4,
                node: NodeId(9)
            }
        );
        assert_eq!(
            BuildDiagnostic::from_link_error(
                4,
                GraphError::OutputOutOfRange {
                    node: NodeId(1),
                    socket: 3
                }
            ),
            BuildDiagnostic::MissingSocket {
                link: 4,
                node: NodeId(1),
                socket: 3,
                side: SocketSide::Output
            }
        );
        let other = BuildDiagnostic::from_link_error(4, GraphError::ActiveGraphNested);
        assert_eq!(other.link(), Some(4));
        assert_eq!(other.node(), None);
    }

    #[test]
    fn display() {
        let diag = BuildDiagnostic::Cycle {
            nodes: vec![NodeId(2), NodeId(3)],
        };
        assert_eq!(diag.to_string(), "nodes on a cycle: NodeId(2), NodeId(3)");
        assert!(!diag.is_loss());

        let diag = BuildDiagnostic::UnknownType {
            node: NodeId(1),
            type_name: "osc".into(),
        };
        assert_eq!(diag.to_string(), "node NodeId(1): unknown type 'osc'");
        assert!(diag.is_loss());
    }
}
