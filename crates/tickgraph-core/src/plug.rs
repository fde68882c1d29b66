//! Input and output sockets ("plugs").
//!
//! Plugs never point at memory directly. An input plug records *where* its
//! value lives: an output of another node in the same graph arena, or a
//! literal owned by the graph. The graph resolves those locations when a node
//! reads its inputs during evaluation.

use crate::node::NodeHandle;
use crate::value::{PlugType, Value};

/// Index of a literal value in the graph's literal table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LiteralId(pub(crate) u32);

impl LiteralId {
    /// Returns the raw index.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// What an input plug reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Nothing: reads the type's default value.
    #[default]
    Unconnected,
    /// Output `socket` of node `node`.
    Output {
        /// Producing node.
        node: NodeHandle,
        /// Output socket index on the producing node.
        socket: usize,
    },
    /// A literal owned by the graph.
    Literal(LiteralId),
}

/// A typed input socket.
#[derive(Clone, Debug)]
pub struct InputPlug {
    ty: PlugType,
    source: InputSource,
}

impl InputPlug {
    /// Creates an unconnected input of type `ty`.
    pub fn new(ty: PlugType) -> Self {
        Self {
            ty,
            source: InputSource::Unconnected,
        }
    }

    /// Declared type of this input.
    #[inline]
    pub fn plug_type(&self) -> PlugType {
        self.ty
    }

    /// Current source of this input.
    #[inline]
    pub fn source(&self) -> InputSource {
        self.source
    }

    /// True if this input is connected to an output or holds a literal.
    #[inline]
    pub fn is_connected(&self) -> bool {
        !matches!(self.source, InputSource::Unconnected)
    }

    /// True if this input is connected to another node's output.
    #[inline]
    pub fn is_linked(&self) -> bool {
        matches!(self.source, InputSource::Output { .. })
    }

    /// Connects this input to an output socket. Replaces any previous source.
    pub fn connect_to(&mut self, node: NodeHandle, socket: usize) {
        self.source = InputSource::Output { node, socket };
    }

    /// Attaches a graph-owned literal. Replaces any previous source.
    pub fn attach_literal(&mut self, literal: LiteralId) {
        self.source = InputSource::Literal(literal);
    }

    /// Clears the source.
    pub fn disconnect(&mut self) {
        self.source = InputSource::Unconnected;
    }
}

/// A typed output socket holding the value its node last wrote.
#[derive(Clone, Debug)]
pub struct OutputPlug {
    ty: PlugType,
    value: Value,
    /// Generation in which this trigger output last fired.
    last_fired: Option<u64>,
}

impl OutputPlug {
    /// Creates an output of type `ty` holding the type's default value.
    pub fn new(ty: PlugType) -> Self {
        Self {
            ty,
            value: ty.default_value(),
            last_fired: None,
        }
    }

    /// Declared type of this output.
    #[inline]
    pub fn plug_type(&self) -> PlugType {
        self.ty
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replaces the value. Returns false (and leaves the plug unchanged) if the
    /// value's type differs from the declared type.
    pub fn set(&mut self, value: Value) -> bool {
        if value.plug_type() != self.ty {
            return false;
        }
        self.value = value;
        true
    }

    /// Mutable access for in-place updates of buffers and strings.
    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Generation in which this output last fired, for trigger outputs.
    pub fn last_fired(&self) -> Option<u64> {
        self.last_fired
    }

    pub(crate) fn mark_fired(&mut self, generation: u64) {
        self.last_fired = Some(generation);
    }
}
