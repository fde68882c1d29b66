//! Abstract graph descriptions, as produced by an editor.
//!
//! A [`GraphDescription`] is read-only input to graph construction: a list of
//! nodes (type name, flags, literal input values by socket name) and a list of
//! links between sockets.
//!
//! # Link direction
//!
//! Links are recorded from the *consuming* side, the way the editor draws them:
//! `src_*` names the node and **input** socket that reads, `dst_*` names the
//! node and **output** socket that is read. [`LinkDescription::wire`] takes the
//! endpoints in dataflow order instead, for code that builds descriptions by
//! hand.
//!
//! # TOML form
//!
//! ```toml
//! [[nodes]]
//! id = 1
//! type = "const"
//! [nodes.inputs]
//! value = "3"
//!
//! [[nodes]]
//! id = 2
//! type = "add"
//! [nodes.inputs]
//! b = "5"
//!
//! [[links]]
//! id = 1
//! src_node_id = 2
//! src_socket_index = 0
//! dst_node_id = 1
//! dst_socket_index = 0
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

fn enabled_by_default() -> bool {
    true
}

/// One node entry of a graph description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Stable identity.
    pub id: NodeId,
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Bypass flag handed to the node.
    #[serde(default)]
    pub passthrough: bool,
    /// Disabled nodes are not instantiated.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Literal values for unconnected inputs, keyed by input socket name.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

impl NodeDescription {
    /// Creates an enabled node description with no input values.
    pub fn new(id: u32, type_name: impl Into<String>) -> Self {
        Self {
            id: NodeId(id),
            type_name: type_name.into(),
            passthrough: false,
            enabled: true,
            inputs: BTreeMap::new(),
        }
    }

    /// Adds a literal value for the input named `name`.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Sets the passthrough flag.
    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Literal text given for input `name`, if any.
    pub fn input_value(&self, name: &str) -> Option<&str> {
        self.inputs.get(name).map(String::as_str)
    }
}

/// One link entry of a graph description. See the module docs for direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    /// Link identity, used in diagnostics.
    pub id: u32,
    /// Consuming node.
    pub src_node_id: NodeId,
    /// Input socket index on the consuming node.
    pub src_socket_index: usize,
    /// Producing node.
    pub dst_node_id: NodeId,
    /// Output socket index on the producing node.
    pub dst_socket_index: usize,
    /// Disabled links are ignored.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl LinkDescription {
    /// Creates an enabled link carrying `producer.output` into `consumer.input`.
    pub fn wire(id: u32, producer: u32, output: usize, consumer: u32, input: usize) -> Self {
        Self {
            id,
            src_node_id: NodeId(consumer),
            src_socket_index: input,
            dst_node_id: NodeId(producer),
            dst_socket_index: output,
            enabled: true,
        }
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A complete graph description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Node entries. Order carries no meaning.
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    /// Link entries.
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

impl GraphDescription {
    /// Creates an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node entry.
    pub fn with_node(mut self, node: NodeDescription) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds a link entry.
    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    /// Finds the first node entry with identity `id`.
    pub fn node(&self, id: NodeId) -> Option<&NodeDescription> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_maps_dataflow_onto_editor_direction() {
        let link = LinkDescription::wire(9, 1, 0, 2, 3);
        assert_eq!(link.dst_node_id, NodeId(1));
        assert_eq!(link.dst_socket_index, 0);
        assert_eq!(link.src_node_id, NodeId(2));
        assert_eq!(link.src_socket_index, 3);
        assert!(link.enabled);
    }

    #[test]
    fn builders_compose() {
        let desc = GraphDescription::new()
            .with_node(NodeDescription::new(1, "const").with_input("value", "2"))
            .with_node(NodeDescription::new(2, "add").with_passthrough(true))
            .with_link(LinkDescription::wire(1, 1, 0, 2, 0));

        assert_eq!(desc.nodes.len(), 2);
        assert_eq!(desc.node(NodeId(1)).unwrap().input_value("value"), Some("2"));
        assert!(desc.node(NodeId(2)).unwrap().passthrough);
        assert!(desc.node(NodeId(3)).is_none());
    }
}
