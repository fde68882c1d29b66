//! The runtime graph: node arena, wiring, tick scheduler and trigger router.
//!
//! [`RuntimeGraph`] owns every node instance, the output plugs they write,
//! the literal values synthesized for unconnected inputs, and an
//! `Arc<SharedState>` with the lock-guarded shared services.
//!
//! Nodes live in a dense arena addressed by [`NodeHandle`]. Predecessor and
//! trigger-target lists hold handles, so they can never dangle; duplicate
//! entries are allowed and harmless because evaluation is guarded by the
//! per-node generation marker.
//!
//! # Lifecycle
//!
//! 1. Add nodes with [`add_node()`](RuntimeGraph::add_node)
//! 2. Wire them with [`connect()`](RuntimeGraph::connect) and
//!    [`attach_literal()`](RuntimeGraph::attach_literal)
//! 3. Run post-construction hooks with [`init_node()`](RuntimeGraph::init_node)
//! 4. Call [`tick()`](RuntimeGraph::tick) once per host frame
//! 5. Drop the graph: every node's `shut` hook runs before release
//!
//! The graph builder in `tickgraph-builder` drives steps 1 to 3 from a
//! [`GraphDescription`](crate::GraphDescription).

mod scheduler;
mod topology;
mod trigger;

use std::collections::HashMap;
use std::sync::Arc;

use crate::active::ActiveGraphGuard;
use crate::context::{InitContext, Wiring};
use crate::description::NodeDescription;
use crate::error::GraphError;
use crate::node::{Node, NodeHandle, NodeId, NodeSummary, TriggerTarget};
use crate::plug::{InputPlug, InputSource, LiteralId, OutputPlug};
use crate::shared::SharedState;
use crate::value::{PlugType, Value};

/// Default cap on nested trigger dispatch.
pub const DEFAULT_MAX_TRIGGER_DEPTH: usize = 64;

/// Arena entry for one node.
struct NodeSlot {
    id: NodeId,
    type_name: String,
    node: Box<dyn Node>,
    inputs: Vec<InputPlug>,
    predecessors: Vec<NodeHandle>,
    trigger_targets: Vec<TriggerTarget>,
    passthrough: bool,
    /// Generation this node was last claimed for; 0 means never.
    last_generation: u64,
}

/// A constructed, runnable node graph.
pub struct RuntimeGraph {
    nodes: Vec<NodeSlot>,
    /// Output plugs, parallel to `nodes`.
    outputs: Vec<Vec<OutputPlug>>,
    index: HashMap<NodeId, NodeHandle>,
    literals: Vec<Value>,
    shared: Arc<SharedState>,
    generation: u64,
    time: f64,
    dt: f32,
    paused: bool,
    max_trigger_depth: usize,
    /// Scratch stack for predecessor traversal, reused across ticks.
    visit_stack: Vec<(NodeHandle, usize)>,
}

impl Default for RuntimeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RuntimeGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuntimeGraph")
            .field("nodes", &self.nodes.len())
            .field("literals", &self.literals.len())
            .field("generation", &self.generation)
            .field("time", &self.time)
            .field("paused", &self.paused)
            .finish()
    }
}

impl RuntimeGraph {
    /// Creates an empty, running graph with fresh shared state.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            outputs: Vec::new(),
            index: HashMap::new(),
            literals: Vec::new(),
            shared: Arc::new(SharedState::new()),
            generation: 0,
            time: 0.0,
            dt: 0.0,
            paused: false,
            max_trigger_depth: DEFAULT_MAX_TRIGGER_DEPTH,
            visit_stack: Vec::new(),
        }
    }

    // --- Settings ---

    /// Pauses or resumes the graph. Ticks on a paused graph do nothing.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Returns true if the graph is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the cap on nested trigger dispatch.
    pub fn set_max_trigger_depth(&mut self, depth: usize) {
        self.max_trigger_depth = depth;
    }

    /// Cap on nested trigger dispatch.
    pub fn max_trigger_depth(&self) -> usize {
        self.max_trigger_depth
    }

    // --- Construction ---

    /// Adds a node with the given socket layout. Inputs start unconnected,
    /// outputs hold their type's default.
    pub fn add_node(
        &mut self,
        id: NodeId,
        type_name: impl Into<String>,
        node: Box<dyn Node>,
        inputs: &[PlugType],
        outputs: &[PlugType],
    ) -> Result<NodeHandle, GraphError> {
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            id,
            type_name: type_name.into(),
            node,
            inputs: inputs.iter().copied().map(InputPlug::new).collect(),
            predecessors: Vec::new(),
            trigger_targets: Vec::new(),
            passthrough: false,
            last_generation: 0,
        });
        self.outputs
            .push(outputs.iter().copied().map(OutputPlug::new).collect());
        self.index.insert(id, handle);
        Ok(handle)
    }

    /// Connects `consumer`'s input `input` to `producer`'s output `output`.
    ///
    /// On success `producer` is appended to `consumer`'s predecessors, and if
    /// the output is a trigger a routing record is appended to `producer`'s
    /// trigger targets. A previous source of the input is replaced; if it was
    /// another output, that link's predecessor entry and trigger route are
    /// removed with it.
    pub fn connect(
        &mut self,
        consumer: NodeId,
        input: usize,
        producer: NodeId,
        output: usize,
    ) -> Result<(), GraphError> {
        let consumer_handle = self.handle(consumer)?;
        let producer_handle = self.handle(producer)?;

        let input_ty = self.nodes[consumer_handle.index()]
            .inputs
            .get(input)
            .map(InputPlug::plug_type)
            .ok_or(GraphError::InputOutOfRange {
                node: consumer,
                socket: input,
            })?;
        let output_ty = self.outputs[producer_handle.index()]
            .get(output)
            .map(OutputPlug::plug_type)
            .ok_or(GraphError::OutputOutOfRange {
                node: producer,
                socket: output,
            })?;
        if input_ty != output_ty {
            return Err(GraphError::TypeMismatch {
                input: input_ty,
                output: output_ty,
            });
        }

        let previous = self.nodes[consumer_handle.index()].inputs[input].source();
        if previous != InputSource::Unconnected {
            tracing::debug!(
                node_id = consumer.index(),
                socket = input,
                "replacing existing input source"
            );
        }
        if let InputSource::Output {
            node: old_producer,
            socket: old_output,
        } = previous
        {
            self.unlink(consumer_handle, input, old_producer, old_output);
        }

        let slot = &mut self.nodes[consumer_handle.index()];
        slot.inputs[input].connect_to(producer_handle, output);
        slot.predecessors.push(producer_handle);

        if output_ty == PlugType::Trigger {
            self.nodes[producer_handle.index()]
                .trigger_targets
                .push(TriggerTarget {
                    receiver: consumer_handle,
                    input,
                    output,
                });
        }
        Ok(())
    }

    /// Forgets the link `producer.output -> consumer.input`: one predecessor
    /// entry and the matching trigger route, if any.
    fn unlink(&mut self, consumer: NodeHandle, input: usize, producer: NodeHandle, output: usize) {
        let predecessors = &mut self.nodes[consumer.index()].predecessors;
        if let Some(pos) = predecessors.iter().position(|&p| p == producer) {
            predecessors.remove(pos);
        }
        self.nodes[producer.index()]
            .trigger_targets
            .retain(|t| !(t.receiver == consumer && t.input == input && t.output == output));
    }

    /// Attaches a graph-owned literal to an unconnected input.
    pub fn attach_literal(
        &mut self,
        node: NodeId,
        input: usize,
        value: Value,
    ) -> Result<LiteralId, GraphError> {
        let handle = self.handle(node)?;
        let plug = self.nodes[handle.index()]
            .inputs
            .get_mut(input)
            .ok_or(GraphError::InputOutOfRange {
                node,
                socket: input,
            })?;
        if plug.is_connected() {
            return Err(GraphError::InputConnected {
                node,
                socket: input,
            });
        }
        if plug.plug_type() != value.plug_type() {
            return Err(GraphError::LiteralTypeMismatch {
                expected: plug.plug_type(),
                found: value.plug_type(),
            });
        }
        let literal = LiteralId(self.literals.len() as u32);
        plug.attach_literal(literal);
        self.literals.push(value);
        Ok(literal)
    }

    /// Runs `id`'s post-construction hook with its description record.
    pub fn init_node(&mut self, id: NodeId, description: &NodeDescription) -> Result<(), GraphError> {
        let handle = self.handle(id)?;
        let h = handle.index();
        let mut own = core::mem::take(&mut self.outputs[h]);
        {
            let slot = &mut self.nodes[h];
            let mut ctx = InitContext {
                id,
                description,
                wiring: Wiring {
                    handle,
                    inputs: &slot.inputs,
                    outputs: &self.outputs,
                    literals: &self.literals,
                },
                outputs: &mut own,
                shared: &self.shared,
            };
            slot.node.init(&mut ctx);
        }
        self.outputs[h] = own;
        Ok(())
    }

    /// Changes a live node's bypass flag.
    pub fn set_passthrough(&mut self, id: NodeId, passthrough: bool) -> Result<(), GraphError> {
        let handle = self.handle(id)?;
        self.nodes[handle.index()].passthrough = passthrough;
        Ok(())
    }

    // --- Queries ---

    fn handle(&self, id: NodeId) -> Result<NodeHandle, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.index.get(&id).map(|h| &self.nodes[h.index()])
    }

    /// Arena handle of `id`.
    pub fn handle_of(&self, id: NodeId) -> Option<NodeHandle> {
        self.index.get(&id).copied()
    }

    /// Returns true if a node with identity `id` exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of graph-owned literal values.
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// A graph-owned literal value.
    pub fn literal(&self, id: LiteralId) -> Option<&Value> {
        self.literals.get(id.index() as usize)
    }

    /// Node identities in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|slot| slot.id)
    }

    /// Registered type name of `id`.
    pub fn type_name(&self, id: NodeId) -> Option<&str> {
        self.slot(id).map(|slot| slot.type_name.as_str())
    }

    /// Bypass flag of `id`.
    pub fn is_passthrough(&self, id: NodeId) -> Option<bool> {
        self.slot(id).map(|slot| slot.passthrough)
    }

    /// Identities of `id`'s predecessors, duplicates included.
    pub fn predecessors(&self, id: NodeId) -> Option<Vec<NodeId>> {
        self.slot(id).map(|slot| {
            slot.predecessors
                .iter()
                .map(|p| self.nodes[p.index()].id)
                .collect()
        })
    }

    /// Trigger routing records stored on `id`.
    pub fn trigger_targets(&self, id: NodeId) -> Option<&[TriggerTarget]> {
        self.slot(id).map(|slot| slot.trigger_targets.as_slice())
    }

    /// Identity of the node behind an arena handle.
    pub fn node_id(&self, handle: NodeHandle) -> Option<NodeId> {
        self.nodes.get(handle.index()).map(|slot| slot.id)
    }

    /// Where `id`'s input `socket` reads from.
    pub fn input_source(&self, id: NodeId, socket: usize) -> Option<InputSource> {
        self.slot(id)?.inputs.get(socket).map(InputPlug::source)
    }

    /// Declared type of `id`'s input `socket`.
    pub fn input_type(&self, id: NodeId, socket: usize) -> Option<PlugType> {
        self.slot(id)?.inputs.get(socket).map(InputPlug::plug_type)
    }

    /// Number of input sockets on `id`.
    pub fn input_count(&self, id: NodeId) -> Option<usize> {
        self.slot(id).map(|slot| slot.inputs.len())
    }

    /// Number of output sockets on `id`.
    pub fn output_count(&self, id: NodeId) -> Option<usize> {
        let handle = self.handle_of(id)?;
        Some(self.outputs[handle.index()].len())
    }

    /// The value `id`'s input `socket` currently reads.
    pub fn input_value(&self, id: NodeId, socket: usize) -> Option<Value> {
        let handle = self.handle_of(id)?;
        let wiring = Wiring {
            handle,
            inputs: &self.nodes[handle.index()].inputs,
            outputs: &self.outputs,
            literals: &self.literals,
        };
        wiring
            .resolve(socket, &self.outputs[handle.index()])
            .cloned()
    }

    /// Current value of `id`'s output `socket`.
    pub fn output(&self, id: NodeId, socket: usize) -> Option<&Value> {
        let handle = self.handle_of(id)?;
        self.outputs[handle.index()].get(socket).map(OutputPlug::value)
    }

    /// Generation in which `id`'s trigger output `socket` last fired.
    pub fn last_fired(&self, id: NodeId, socket: usize) -> Option<u64> {
        let handle = self.handle_of(id)?;
        self.outputs[handle.index()].get(socket)?.last_fired()
    }

    /// Generation in which `id` was last evaluated, if ever.
    pub fn last_evaluated(&self, id: NodeId) -> Option<u64> {
        self.slot(id)
            .map(|slot| slot.last_generation)
            .filter(|&generation| generation != 0)
    }

    /// Asks `id` to describe itself for inspection tooling.
    pub fn describe_node(&self, id: NodeId) -> Option<NodeSummary> {
        let slot = self.slot(id)?;
        let mut summary = NodeSummary::default();
        slot.node.describe(&mut summary);
        Some(summary)
    }

    /// The graph's shared services.
    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Number of ticks run so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sum of `dt` over every tick run while not paused, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }
}

impl Drop for RuntimeGraph {
    fn drop(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let guard = ActiveGraphGuard::enter(Arc::clone(&self.shared));
        if guard.is_err() {
            tracing::warn!("shutting down graph nodes while another graph is active");
        }
        for slot in &mut self.nodes {
            slot.node.shut(&self.shared);
        }
        drop(guard);
        tracing::debug!(nodes = self.nodes.len(), "graph torn down");
        self.nodes.clear();
        self.literals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvalContext;

    struct Sink;

    impl Node for Sink {
        fn evaluate(&mut self, _ctx: &mut EvalContext<'_>) {}
    }

    fn add(graph: &mut RuntimeGraph, id: u32, inputs: &[PlugType], outputs: &[PlugType]) {
        graph
            .add_node(NodeId(id), "sink", Box::new(Sink), inputs, outputs)
            .unwrap();
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[]);
        assert_eq!(
            graph
                .add_node(NodeId(1), "sink", Box::new(Sink), &[], &[])
                .unwrap_err(),
            GraphError::DuplicateNode(NodeId(1))
        );
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn connect_records_predecessor() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[PlugType::Float]);
        add(&mut graph, 2, &[PlugType::Float, PlugType::Float], &[]);
        graph.connect(NodeId(2), 0, NodeId(1), 0).unwrap();
        graph.connect(NodeId(2), 1, NodeId(1), 0).unwrap();
        assert_eq!(graph.predecessors(NodeId(2)).unwrap(), vec![NodeId(1), NodeId(1)]);

        // Relinking an input keeps one entry per linked input.
        graph.connect(NodeId(2), 0, NodeId(1), 0).unwrap();
        assert_eq!(graph.predecessors(NodeId(2)).unwrap(), vec![NodeId(1), NodeId(1)]);
        assert!(graph.trigger_targets(NodeId(1)).unwrap().is_empty());
        assert_eq!(
            graph.input_source(NodeId(2), 0),
            Some(InputSource::Output {
                node: graph.handle_of(NodeId(1)).unwrap(),
                socket: 0
            })
        );
    }

    #[test]
    fn trigger_link_records_target_on_producer() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[PlugType::Float, PlugType::Trigger]);
        add(&mut graph, 2, &[PlugType::Trigger], &[]);
        graph.connect(NodeId(2), 0, NodeId(1), 1).unwrap();

        let targets = graph.trigger_targets(NodeId(1)).unwrap();
        assert_eq!(
            targets,
            &[TriggerTarget {
                receiver: graph.handle_of(NodeId(2)).unwrap(),
                input: 0,
                output: 1,
            }]
        );
    }

    #[test]
    fn relinking_input_drops_old_route() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[PlugType::Trigger]);
        add(&mut graph, 2, &[], &[PlugType::Trigger]);
        add(&mut graph, 3, &[PlugType::Trigger], &[]);
        graph.connect(NodeId(3), 0, NodeId(1), 0).unwrap();
        graph.connect(NodeId(3), 0, NodeId(2), 0).unwrap();

        assert!(graph.trigger_targets(NodeId(1)).unwrap().is_empty());
        assert_eq!(graph.trigger_targets(NodeId(2)).unwrap().len(), 1);
        assert_eq!(graph.predecessors(NodeId(3)).unwrap(), vec![NodeId(2)]);
    }

    #[test]
    fn relinking_input_removes_stale_cycle_edge() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[PlugType::Float], &[PlugType::Float]);
        add(&mut graph, 2, &[PlugType::Float], &[PlugType::Float]);
        add(&mut graph, 3, &[], &[PlugType::Float]);
        graph.connect(NodeId(2), 0, NodeId(1), 0).unwrap();
        graph.connect(NodeId(1), 0, NodeId(2), 0).unwrap();
        assert_eq!(graph.cyclic_nodes(), vec![NodeId(1), NodeId(2)]);

        graph.connect(NodeId(1), 0, NodeId(3), 0).unwrap();
        assert!(graph.cyclic_nodes().is_empty());
    }

    #[test]
    fn connect_errors() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[PlugType::Trigger]);
        add(&mut graph, 2, &[PlugType::Float], &[]);
        assert_eq!(
            graph.connect(NodeId(2), 0, NodeId(9), 0),
            Err(GraphError::NodeNotFound(NodeId(9)))
        );
        assert_eq!(
            graph.connect(NodeId(2), 3, NodeId(1), 0),
            Err(GraphError::InputOutOfRange {
                node: NodeId(2),
                socket: 3
            })
        );
        assert_eq!(
            graph.connect(NodeId(2), 0, NodeId(1), 1),
            Err(GraphError::OutputOutOfRange {
                node: NodeId(1),
                socket: 1
            })
        );
        assert_eq!(
            graph.connect(NodeId(2), 0, NodeId(1), 0),
            Err(GraphError::TypeMismatch {
                input: PlugType::Float,
                output: PlugType::Trigger
            })
        );
        assert!(graph.predecessors(NodeId(2)).unwrap().is_empty());
    }

    #[test]
    fn literal_attach_rules() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[PlugType::Float]);
        add(&mut graph, 2, &[PlugType::Float, PlugType::Float], &[]);
        graph.connect(NodeId(2), 0, NodeId(1), 0).unwrap();

        assert_eq!(
            graph.attach_literal(NodeId(2), 0, Value::Float(1.0)),
            Err(GraphError::InputConnected {
                node: NodeId(2),
                socket: 0
            })
        );
        assert_eq!(
            graph.attach_literal(NodeId(2), 1, Value::Int(1)),
            Err(GraphError::LiteralTypeMismatch {
                expected: PlugType::Float,
                found: PlugType::Int
            })
        );
        let id = graph.attach_literal(NodeId(2), 1, Value::Float(5.0)).unwrap();
        assert_eq!(graph.literal(id), Some(&Value::Float(5.0)));
        assert_eq!(graph.input_value(NodeId(2), 1), Some(Value::Float(5.0)));
        assert_eq!(graph.literal_count(), 1);
    }

    #[test]
    fn unconnected_input_reads_default() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[PlugType::String], &[]);
        assert_eq!(graph.input_value(NodeId(1), 0), Some(Value::String(String::new())));
        assert_eq!(graph.input_value(NodeId(1), 1), None);
    }

    #[test]
    fn passthrough_toggle() {
        let mut graph = RuntimeGraph::new();
        add(&mut graph, 1, &[], &[]);
        assert_eq!(graph.is_passthrough(NodeId(1)), Some(false));
        graph.set_passthrough(NodeId(1), true).unwrap();
        assert_eq!(graph.is_passthrough(NodeId(1)), Some(true));
        assert!(graph.set_passthrough(NodeId(5), true).is_err());
    }
}
