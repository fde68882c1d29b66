//! Description + registry -> runtime graph.

use std::collections::HashSet;
use std::sync::Arc;

use tickgraph_core::{
    ActiveGraphGuard, DEFAULT_MAX_TRIGGER_DEPTH, GraphDescription, InputSource, LiteralError,
    NodeDescription, RuntimeGraph, parse_literal,
};
use tickgraph_registry::{TypeDescriptor, TypeRegistry};

use crate::diagnostic::{BuildDiagnostic, BuildError};

/// A built graph together with every problem recovered from on the way.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The runtime graph. Usable even when `diagnostics` is non-empty.
    pub graph: RuntimeGraph,
    /// Recovered construction problems, in the order they were found.
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl BuildOutcome {
    /// True if nothing from the description was dropped or altered.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(BuildDiagnostic::is_loss)
    }
}

/// Constructs runtime graphs.
///
/// ```rust
/// use tickgraph_builder::GraphBuilder;
/// use tickgraph_core::{GraphDescription, LinkDescription, NodeDescription, NodeId, Value};
/// use tickgraph_registry::TypeRegistry;
///
/// let registry = TypeRegistry::with_builtin_types();
/// let description = GraphDescription::new()
///     .with_node(NodeDescription::new(1, "const").with_input("value", "3"))
///     .with_node(NodeDescription::new(2, "add").with_input("b", "5"))
///     .with_link(LinkDescription::wire(1, 1, 0, 2, 0));
///
/// let mut outcome = GraphBuilder::new().build(&description, &registry).unwrap();
/// assert!(outcome.diagnostics.is_empty());
///
/// outcome.graph.tick(1.0 / 60.0);
/// assert_eq!(outcome.graph.output(NodeId(2), 0).and_then(Value::as_float), Some(8.0));
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    max_trigger_depth: usize,
    start_paused: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Builder with default settings: running, trigger depth
    /// [`DEFAULT_MAX_TRIGGER_DEPTH`].
    pub fn new() -> Self {
        Self {
            max_trigger_depth: DEFAULT_MAX_TRIGGER_DEPTH,
            start_paused: false,
        }
    }

    /// Sets the trigger dispatch depth limit of built graphs.
    pub fn with_max_trigger_depth(mut self, depth: usize) -> Self {
        self.max_trigger_depth = depth;
        self
    }

    /// Builds graphs in the paused state.
    pub fn with_start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    /// Builds a runtime graph from `description`, instantiating node types
    /// from `registry`.
    ///
    /// Construction runs in four passes: nodes, links, literals, then each
    /// node's init hook. Problems in any pass drop only the offending item
    /// and are returned as diagnostics (and logged). The graph's shared state
    /// is published as the thread's active graph while construction runs.
    ///
    /// # Errors
    ///
    /// [`BuildError::ActiveGraphNested`] if another graph is already active on
    /// this thread.
    pub fn build(
        &self,
        description: &GraphDescription,
        registry: &TypeRegistry,
    ) -> Result<BuildOutcome, BuildError> {
        let mut graph = RuntimeGraph::new();
        graph.set_max_trigger_depth(self.max_trigger_depth);
        graph.set_paused(self.start_paused);

        let guard = ActiveGraphGuard::enter(Arc::clone(graph.shared()))
            .map_err(|_| BuildError::ActiveGraphNested)?;

        let mut diagnostics = Vec::new();
        let added = add_nodes(&mut graph, description, registry, &mut diagnostics);
        connect_links(&mut graph, description, &mut diagnostics);
        for (node, descriptor) in &added {
            attach_literals(&mut graph, node, descriptor, &mut diagnostics);
        }
        for (node, _) in &added {
            if let Err(err) = graph.init_node(node.id, node) {
                tracing::error!(node_id = node.id.index(), %err, "init of a built node failed");
            }
        }

        let cyclic = graph.cyclic_nodes();
        if !cyclic.is_empty() {
            diagnostics.push(BuildDiagnostic::Cycle { nodes: cyclic });
        }
        drop(guard);

        for diagnostic in &diagnostics {
            diagnostic.report();
        }
        tracing::debug!(
            nodes = graph.node_count(),
            literals = graph.literal_count(),
            diagnostics = diagnostics.len(),
            "graph built"
        );
        Ok(BuildOutcome { graph, diagnostics })
    }
}

/// Builds a graph with default settings. See [`GraphBuilder::build`].
pub fn build(
    description: &GraphDescription,
    registry: &TypeRegistry,
) -> Result<BuildOutcome, BuildError> {
    GraphBuilder::new().build(description, registry)
}

// --- Passes ---

/// Instantiates every enabled node entry. Returns the entries that made it
/// into the graph, with their type descriptors.
fn add_nodes<'a>(
    graph: &mut RuntimeGraph,
    description: &'a GraphDescription,
    registry: &'a TypeRegistry,
    diagnostics: &mut Vec<BuildDiagnostic>,
) -> Vec<(&'a NodeDescription, &'a TypeDescriptor)> {
    let mut added = Vec::with_capacity(description.nodes.len());
    let mut seen = HashSet::new();

    for node in description.nodes.iter().filter(|n| n.enabled) {
        if !seen.insert(node.id) {
            diagnostics.push(BuildDiagnostic::DuplicateNode { node: node.id });
            continue;
        }
        let (Some(descriptor), Some(instance)) = (
            registry.get(&node.type_name),
            registry.create(&node.type_name),
        ) else {
            diagnostics.push(BuildDiagnostic::UnknownType {
                node: node.id,
                type_name: node.type_name.clone(),
            });
            continue;
        };

        let added_ok = graph
            .add_node(
                node.id,
                node.type_name.as_str(),
                instance,
                &descriptor.input_types(),
                &descriptor.output_types(),
            )
            .and_then(|_| graph.set_passthrough(node.id, node.passthrough));
        match added_ok {
            Ok(()) => added.push((node, descriptor)),
            Err(_) => diagnostics.push(BuildDiagnostic::DuplicateNode { node: node.id }),
        }
    }
    added
}

/// Connects every enabled link. Links to nodes that were never added report
/// a missing endpoint; a second link into the same input replaces the first.
fn connect_links(
    graph: &mut RuntimeGraph,
    description: &GraphDescription,
    diagnostics: &mut Vec<BuildDiagnostic>,
) {
    for link in description.links.iter().filter(|l| l.enabled) {
        let relinked = matches!(
            graph.input_source(link.src_node_id, link.src_socket_index),
            Some(InputSource::Output { .. })
        );
        let connected = graph.connect(
            link.src_node_id,
            link.src_socket_index,
            link.dst_node_id,
            link.dst_socket_index,
        );
        match connected {
            Ok(()) if relinked => diagnostics.push(BuildDiagnostic::InputRelinked {
                link: link.id,
                node: link.src_node_id,
                socket: link.src_socket_index,
            }),
            Ok(()) => {}
            Err(err) => diagnostics.push(BuildDiagnostic::from_link_error(link.id, err)),
        }
    }
}

/// Attaches literals to the unconnected inputs of one node: the description's
/// value where given, otherwise the type's declared default. Inputs with
/// neither stay at their kind's zero value.
fn attach_literals(
    graph: &mut RuntimeGraph,
    node: &NodeDescription,
    descriptor: &TypeDescriptor,
    diagnostics: &mut Vec<BuildDiagnostic>,
) {
    for name in node.inputs.keys() {
        if descriptor.input_index(name).is_none() {
            diagnostics.push(BuildDiagnostic::UnknownInput {
                node: node.id,
                input: name.clone(),
            });
        }
    }

    for (index, socket) in descriptor.inputs.iter().enumerate() {
        if graph.input_source(node.id, index) != Some(InputSource::Unconnected) {
            continue;
        }
        let given = node.input_value(socket.name);
        let Some(text) = given.or(socket.default) else {
            continue;
        };

        let value = match parse_literal(socket.plug_type, text) {
            Ok(value) => value,
            Err(LiteralError::Malformed { fallback, .. }) => {
                diagnostics.push(BuildDiagnostic::MalformedLiteral {
                    node: node.id,
                    input: socket.name.to_string(),
                    plug_type: socket.plug_type,
                    text: text.to_string(),
                });
                fallback
            }
            Err(LiteralError::Unsupported { ty }) => {
                // Declared defaults on such sockets are ignored quietly.
                if given.is_some() {
                    diagnostics.push(BuildDiagnostic::UnsupportedLiteral {
                        node: node.id,
                        input: socket.name.to_string(),
                        plug_type: ty,
                    });
                }
                continue;
            }
        };
        if let Err(err) = graph.attach_literal(node.id, index, value) {
            tracing::error!(node_id = node.id.index(), socket = index, %err, "literal rejected");
        }
    }
}
