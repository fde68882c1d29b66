//! Document validation.
//!
//! Checks a [`GraphDocument`] against a [`TypeRegistry`] without building it.
//! Every problem the builder would recover from is reported here up front,
//! together with document-level problems the builder cannot see (a zero tick
//! rate, repeated link ids, inputs linked twice).
//!
//! # Example
//!
//! ```rust
//! use tickgraph_config::{GraphDocument, validate_document};
//! use tickgraph_core::NodeDescription;
//! use tickgraph_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::with_builtin_types();
//! let doc = GraphDocument::new("demo").with_node(NodeDescription::new(1, "const"));
//! assert!(validate_document(&doc, &registry).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tickgraph_core::{LiteralError, NodeDescription, NodeId, PlugType, parse_literal};
use tickgraph_registry::{TypeDescriptor, TypeRegistry};

use crate::document::GraphDocument;

/// One problem found in a document.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationIssue {
    /// The engine's tick rate is zero.
    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(u32),

    /// Two node entries share an id.
    #[error("duplicate node id {node}")]
    DuplicateNode {
        /// Repeated identity.
        node: NodeId,
    },

    /// Two link entries share an id.
    #[error("duplicate link id {link}")]
    DuplicateLink {
        /// Repeated link id.
        link: u32,
    },

    /// Node type not in the registry.
    #[error("node {node}: unknown type '{type_name}'")]
    UnknownType {
        /// Node entry.
        node: NodeId,
        /// Requested type name.
        type_name: String,
    },

    /// A link names a node id that no entry has.
    #[error("link {link}: node {node} does not exist")]
    DanglingLink {
        /// Link entry.
        link: u32,
        /// Missing node.
        node: NodeId,
    },

    /// A link names an input index past the consuming type's inputs.
    #[error("link {link}: {node} has no input socket {socket}")]
    InputOutOfRange {
        /// Link entry.
        link: u32,
        /// Consuming node.
        node: NodeId,
        /// Requested index.
        socket: usize,
    },

    /// A link names an output index past the producing type's outputs.
    #[error("link {link}: {node} has no output socket {socket}")]
    OutputOutOfRange {
        /// Link entry.
        link: u32,
        /// Producing node.
        node: NodeId,
        /// Requested index.
        socket: usize,
    },

    /// A link joins sockets of different kinds.
    #[error("link {link}: cannot connect {output} output to {input} input")]
    TypeMismatch {
        /// Link entry.
        link: u32,
        /// Input kind.
        input: PlugType,
        /// Output kind.
        output: PlugType,
    },

    /// More than one enabled link feeds the same input; the last one wins.
    #[error("{node} input socket {socket} is linked more than once")]
    InputLinkedTwice {
        /// Consuming node.
        node: NodeId,
        /// Input index.
        socket: usize,
    },

    /// A node entry names an input its type does not declare.
    #[error("node {node}: type has no input named '{input}'")]
    UnknownInput {
        /// Node entry.
        node: NodeId,
        /// Input name.
        input: String,
    },

    /// A value is given for an input whose kind cannot hold a literal.
    #[error("node {node}: input '{input}' of type {plug_type} cannot take a literal")]
    UnsupportedLiteral {
        /// Node entry.
        node: NodeId,
        /// Input name.
        input: String,
        /// Declared kind.
        plug_type: PlugType,
    },

    /// A value does not parse as its input's kind.
    #[error("node {node}: input '{input}' has malformed {plug_type} literal '{text}'")]
    MalformedLiteral {
        /// Node entry.
        node: NodeId,
        /// Input name.
        input: String,
        /// Declared kind.
        plug_type: PlugType,
        /// Offending text.
        text: String,
    },
}

/// Checks `doc` against `registry` and returns every issue found, in
/// document order. Disabled nodes and links are skipped; a link touching a
/// disabled node is not an issue.
pub fn validate_document(doc: &GraphDocument, registry: &TypeRegistry) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if doc.engine.tick_rate_hz == 0 {
        issues.push(ValidationIssue::InvalidTickRate(0));
    }

    let mut all_ids = HashSet::new();
    let mut types: HashMap<NodeId, Option<&TypeDescriptor>> = HashMap::new();
    for node in &doc.nodes {
        if !all_ids.insert(node.id) {
            issues.push(ValidationIssue::DuplicateNode { node: node.id });
            continue;
        }
        if !node.enabled {
            continue;
        }
        let descriptor = registry.get(&node.type_name);
        match descriptor {
            Some(descriptor) => check_inputs(node, descriptor, &mut issues),
            None => issues.push(ValidationIssue::UnknownType {
                node: node.id,
                type_name: node.type_name.clone(),
            }),
        }
        types.insert(node.id, descriptor);
    }

    let mut link_ids = HashSet::new();
    let mut fed = HashSet::new();
    for link in &doc.links {
        if !link_ids.insert(link.id) {
            issues.push(ValidationIssue::DuplicateLink { link: link.id });
        }
        if !link.enabled {
            continue;
        }

        let mut endpoints = [link.src_node_id, link.dst_node_id]
            .into_iter()
            .filter(|id| !all_ids.contains(id));
        if let Some(missing) = endpoints.next() {
            issues.push(ValidationIssue::DanglingLink {
                link: link.id,
                node: missing,
            });
            continue;
        }
        // Either endpoint disabled, or either type unknown (already reported).
        let (Some(Some(consumer)), Some(Some(producer))) =
            (types.get(&link.src_node_id), types.get(&link.dst_node_id))
        else {
            continue;
        };

        let input = consumer.inputs.get(link.src_socket_index);
        let output = producer.outputs.get(link.dst_socket_index);
        match (input, output) {
            (None, _) => issues.push(ValidationIssue::InputOutOfRange {
                link: link.id,
                node: link.src_node_id,
                socket: link.src_socket_index,
            }),
            (_, None) => issues.push(ValidationIssue::OutputOutOfRange {
                link: link.id,
                node: link.dst_node_id,
                socket: link.dst_socket_index,
            }),
            (Some(input), Some(output)) if input.plug_type != output.plug_type => {
                issues.push(ValidationIssue::TypeMismatch {
                    link: link.id,
                    input: input.plug_type,
                    output: output.plug_type,
                });
            }
            (Some(_), Some(_)) => {
                if !fed.insert((link.src_node_id, link.src_socket_index)) {
                    issues.push(ValidationIssue::InputLinkedTwice {
                        node: link.src_node_id,
                        socket: link.src_socket_index,
                    });
                }
            }
        }
    }

    issues
}

fn check_inputs(
    node: &NodeDescription,
    descriptor: &TypeDescriptor,
    issues: &mut Vec<ValidationIssue>,
) {
    for (name, text) in &node.inputs {
        let Some(socket) = descriptor.inputs.iter().find(|s| s.name == name) else {
            issues.push(ValidationIssue::UnknownInput {
                node: node.id,
                input: name.clone(),
            });
            continue;
        };
        match parse_literal(socket.plug_type, text) {
            Ok(_) => {}
            Err(LiteralError::Unsupported { ty }) => {
                issues.push(ValidationIssue::UnsupportedLiteral {
                    node: node.id,
                    input: name.clone(),
                    plug_type: ty,
                });
            }
            Err(LiteralError::Malformed { ty, .. }) => {
                issues.push(ValidationIssue::MalformedLiteral {
                    node: node.id,
                    input: name.clone(),
                    plug_type: ty,
                    text: text.clone(),
                });
            }
        }
    }
}
