//! Graph document file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tickgraph_builder::{BuildError, BuildOutcome, GraphBuilder};
use tickgraph_core::{
    DEFAULT_MAX_TRIGGER_DEPTH, GraphDescription, LinkDescription, NodeDescription,
};
use tickgraph_registry::TypeRegistry;

use crate::error::ConfigError;

fn default_tick_rate() -> u32 {
    60
}

fn default_max_trigger_depth() -> usize {
    DEFAULT_MAX_TRIGGER_DEPTH
}

/// Engine settings carried in a document's `[engine]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Host tick rate; one tick covers `1 / tick_rate_hz` seconds.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: u32,
    /// Build the graph paused.
    #[serde(default)]
    pub start_paused: bool,
    /// Trigger dispatch depth limit.
    #[serde(default = "default_max_trigger_depth")]
    pub max_trigger_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate(),
            start_paused: false,
            max_trigger_depth: DEFAULT_MAX_TRIGGER_DEPTH,
        }
    }
}

impl EngineSettings {
    /// Seconds covered by one tick. Zero rate yields zero.
    pub fn dt(&self) -> f32 {
        if self.tick_rate_hz == 0 {
            0.0
        } else {
            1.0 / self.tick_rate_hz as f32
        }
    }

    /// A graph builder configured with these settings.
    pub fn builder(&self) -> GraphBuilder {
        GraphBuilder::new()
            .with_start_paused(self.start_paused)
            .with_max_trigger_depth(self.max_trigger_depth)
    }
}

/// A graph description stored as TOML, with engine settings.
///
/// # TOML Format
///
/// ```toml
/// name = "Blink"
///
/// [engine]
/// tick_rate_hz = 30
///
/// [[nodes]]
/// id = 1
/// type = "trigger.interval"
/// [nodes.inputs]
/// period = "0.5"
///
/// [[nodes]]
/// id = 2
/// type = "trigger.counter"
///
/// [[links]]
/// id = 1
/// src_node_id = 2
/// src_socket_index = 0
/// dst_node_id = 1
/// dst_socket_index = 0
/// ```
///
/// Links name the consuming node and input as `src_*` and the producing node
/// and output as `dst_*`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    /// Name of the graph.
    pub name: String,

    /// Optional description of the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Engine settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Node entries.
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,

    /// Link entries.
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

impl Default for GraphDocument {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl GraphDocument {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            engine: EngineSettings::default(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Wraps an existing graph description.
    pub fn from_description(name: impl Into<String>, graph: GraphDescription) -> Self {
        Self {
            nodes: graph.nodes,
            links: graph.links,
            ..Self::new(name)
        }
    }

    /// Set the description text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the engine settings.
    pub fn with_engine(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    /// Add a node entry.
    pub fn with_node(mut self, node: NodeDescription) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a link entry.
    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    /// The node and link entries as a graph description.
    pub fn graph(&self) -> GraphDescription {
        GraphDescription {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    /// Builds the described graph with this document's engine settings.
    pub fn build(&self, registry: &TypeRegistry) -> Result<BuildOutcome, BuildError> {
        self.engine.builder().build(&self.graph(), registry)
    }

    /// Load a document from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let document = Self::from_toml(&content)?;
        tracing::debug!(
            path = %path.display(),
            nodes = document.nodes.len(),
            links = document.links.len(),
            "graph document loaded"
        );
        Ok(document)
    }

    /// Load a document from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the document to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the document to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickgraph_core::NodeId;

    const BLINK: &str = r#"
name = "Blink"

[engine]
tick_rate_hz = 30

[[nodes]]
id = 1
type = "trigger.interval"
[nodes.inputs]
period = "0.5"

[[nodes]]
id = 2
type = "trigger.counter"
passthrough = true

[[links]]
id = 1
src_node_id = 2
src_socket_index = 0
dst_node_id = 1
dst_socket_index = 0
"#;

    #[test]
    fn parses_documented_format() {
        let doc = GraphDocument::from_toml(BLINK).unwrap();
        assert_eq!(doc.name, "Blink");
        assert_eq!(doc.engine.tick_rate_hz, 30);
        assert_eq!(doc.engine.max_trigger_depth, DEFAULT_MAX_TRIGGER_DEPTH);
        assert!(!doc.engine.start_paused);

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].type_name, "trigger.interval");
        assert_eq!(doc.nodes[0].input_value("period"), Some("0.5"));
        assert!(doc.nodes[0].enabled);
        assert!(doc.nodes[1].passthrough);

        let link = &doc.links[0];
        assert_eq!(link.src_node_id, NodeId(2));
        assert_eq!(link.dst_node_id, NodeId(1));
        assert!(link.enabled);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let doc = GraphDocument::from_toml("name = \"Empty\"").unwrap();
        assert_eq!(doc.engine, EngineSettings::default());
        assert!(doc.nodes.is_empty());
        assert!(doc.links.is_empty());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = GraphDocument::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn toml_text_reloads_equal() {
        let doc = GraphDocument::from_toml(BLINK)
            .unwrap()
            .with_description("two nodes");
        let text = doc.to_toml().unwrap();
        assert_eq!(GraphDocument::from_toml(&text).unwrap(), doc);
    }

    #[test]
    fn dt_follows_tick_rate() {
        let mut engine = EngineSettings::default();
        assert!((engine.dt() - 1.0 / 60.0).abs() < 1e-9);
        engine.tick_rate_hz = 0;
        assert_eq!(engine.dt(), 0.0);
    }
}
