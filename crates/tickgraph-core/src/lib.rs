//! Tickgraph Core - node-graph execution engine
//!
//! A runtime graph of typed processing nodes connected by typed sockets,
//! re-evaluated once per logical frame ("tick").
//!
//! # Core Abstractions
//!
//! ## Values and Plugs
//!
//! - [`PlugType`] / [`Value`] - the closed set of socket kinds and their values
//! - [`FloatBuffer`] - scalar-or-buffer float vectors
//! - [`InputPlug`] / [`OutputPlug`] - typed sockets; inputs read a linked
//!   output, a graph-owned literal, or their type's default
//! - [`parse_literal`] - literal synthesis from description text
//!
//! ## Nodes
//!
//! - [`Node`] - the contract every node type implements
//! - [`EvalContext`] / [`InitContext`] - what a node sees while it runs
//! - [`NodeId`] (stable identity) and [`NodeHandle`] (arena index)
//!
//! ## Graph
//!
//! - [`RuntimeGraph`] - node arena, tick scheduler, trigger router
//! - [`GraphDescription`] - the editor's node and link lists
//!
//! ## Shared State
//!
//! - [`SharedState`] - one lock guarding control values, memory banks, flags
//!   and graph events for every node of a graph
//! - [`ActiveGraphGuard`] - the thread-local "currently active graph" handle
//!
//! # Example
//!
//! ```rust
//! use tickgraph_core::{EvalContext, Node, NodeId, PlugType, RuntimeGraph, Value};
//!
//! struct Doubler;
//!
//! impl Node for Doubler {
//!     fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
//!         let x = ctx.input_float(0);
//!         ctx.set_float(0, x * 2.0);
//!     }
//! }
//!
//! let mut graph = RuntimeGraph::new();
//! graph
//!     .add_node(NodeId(1), "doubler", Box::new(Doubler), &[PlugType::Float], &[PlugType::Float])
//!     .unwrap();
//! graph.attach_literal(NodeId(1), 0, Value::Float(21.0)).unwrap();
//!
//! graph.tick(1.0 / 60.0);
//! assert_eq!(graph.output(NodeId(1), 0), Some(&Value::Float(42.0)));
//! ```

pub mod active;
pub mod context;
pub mod description;
pub mod error;
pub mod graph;
pub mod node;
pub mod plug;
pub mod shared;
pub mod value;

pub use active::{ActiveGraphGuard, active_shared, is_active, with_active};
pub use context::{EvalContext, InitContext};
pub use description::{GraphDescription, LinkDescription, NodeDescription};
pub use error::GraphError;
pub use graph::{DEFAULT_MAX_TRIGGER_DEPTH, RuntimeGraph};
pub use node::{Node, NodeHandle, NodeId, NodeSummary, TriggerEvent, TriggerTarget};
pub use plug::{InputPlug, InputSource, LiteralId, OutputPlug};
pub use shared::{
    ControlKind, ControlValue, ControlValueSpec, Memf, Registration, SharedSnapshot, SharedState,
};
pub use value::{Channels, FloatBuffer, LiteralError, PlugType, Value, parse_literal};
