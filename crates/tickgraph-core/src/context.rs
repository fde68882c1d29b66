//! Contexts handed to node hooks.
//!
//! [`EvalContext`] is what a node sees during `evaluate` and `on_trigger`:
//! resolved input values, its own outputs, the graph's shared state and the
//! tick's timing. [`InitContext`] is the narrower view given to `init`, after
//! construction is complete.

use crate::description::NodeDescription;
use crate::node::{NodeHandle, NodeId};
use crate::plug::{InputPlug, InputSource, OutputPlug};
use crate::shared::SharedState;
use crate::value::{Channels, FloatBuffer, PlugType, Value};

/// Resolves input plugs to values.
///
/// The node being evaluated has its outputs moved out of `outputs` for the
/// duration of the call, so reads of its own outputs go to `own` instead.
pub(crate) struct Wiring<'a> {
    pub(crate) handle: NodeHandle,
    pub(crate) inputs: &'a [InputPlug],
    pub(crate) outputs: &'a [Vec<OutputPlug>],
    pub(crate) literals: &'a [Value],
}

impl Wiring<'_> {
    pub(crate) fn resolve<'s>(&'s self, index: usize, own: &'s [OutputPlug]) -> Option<&'s Value> {
        let plug = self.inputs.get(index)?;
        let value = match plug.source() {
            InputSource::Unconnected => plug.plug_type().default_ref(),
            InputSource::Output { node, socket } => {
                let plugs = if node == self.handle {
                    own
                } else {
                    self.outputs.get(node.index()).map_or(&[][..], Vec::as_slice)
                };
                match plugs.get(socket) {
                    Some(output) => output.value(),
                    None => plug.plug_type().default_ref(),
                }
            }
            InputSource::Literal(id) => self
                .literals
                .get(id.index() as usize)
                .unwrap_or_else(|| plug.plug_type().default_ref()),
        };
        Some(value)
    }

    fn input_type(&self, index: usize) -> Option<PlugType> {
        self.inputs.get(index).map(InputPlug::plug_type)
    }

    fn is_connected(&self, index: usize) -> bool {
        self.inputs.get(index).is_some_and(InputPlug::is_connected)
    }

    fn is_linked(&self, index: usize) -> bool {
        self.inputs.get(index).is_some_and(InputPlug::is_linked)
    }
}

/// Writes `value` into output `index`, logging rejected writes.
fn write_output(node: NodeId, outputs: &mut [OutputPlug], index: usize, value: Value) -> bool {
    let Some(plug) = outputs.get_mut(index) else {
        tracing::warn!(node_id = node.index(), socket = index, "write to missing output");
        return false;
    };
    let ty = value.plug_type();
    if plug.set(value) {
        true
    } else {
        tracing::warn!(
            node_id = node.index(),
            socket = index,
            expected = %plug.plug_type(),
            found = %ty,
            "output type mismatch"
        );
        false
    }
}

/// Per-call view of the graph for [`Node::evaluate`](crate::Node::evaluate)
/// and [`Node::on_trigger`](crate::Node::on_trigger).
pub struct EvalContext<'a> {
    pub(crate) id: NodeId,
    pub(crate) wiring: Wiring<'a>,
    pub(crate) outputs: &'a mut [OutputPlug],
    pub(crate) shared: &'a SharedState,
    pub(crate) fired: &'a mut Vec<usize>,
    pub(crate) dt: f32,
    pub(crate) time: f64,
    pub(crate) generation: u64,
    pub(crate) passthrough: bool,
}

impl EvalContext<'_> {
    /// Identity of the node being run.
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// Seconds covered by the current tick.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Graph time at the start of the current tick, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current tick generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The node's bypass flag.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// The graph's shared services.
    pub fn shared(&self) -> &SharedState {
        self.shared
    }

    // --- Inputs ---

    /// Number of input sockets.
    pub fn input_count(&self) -> usize {
        self.wiring.inputs.len()
    }

    /// Declared type of input `index`.
    pub fn input_type(&self, index: usize) -> Option<PlugType> {
        self.wiring.input_type(index)
    }

    /// True if input `index` reads an output or a literal.
    pub fn is_connected(&self, index: usize) -> bool {
        self.wiring.is_connected(index)
    }

    /// True if input `index` reads another node's output.
    pub fn is_linked(&self, index: usize) -> bool {
        self.wiring.is_linked(index)
    }

    /// Value of input `index`: the connected output's current value, the
    /// literal, or the type's default. `None` only if the socket is missing.
    pub fn input(&self, index: usize) -> Option<&Value> {
        self.wiring.resolve(index, &*self.outputs)
    }

    /// Input `index` as a bool; `false` for other kinds.
    pub fn input_bool(&self, index: usize) -> bool {
        self.input(index).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Input `index` as an int; `0` for other kinds.
    pub fn input_int(&self, index: usize) -> i32 {
        self.input(index).and_then(Value::as_int).unwrap_or(0)
    }

    /// Input `index` as a scalar. Float vectors read as their first sample.
    pub fn input_float(&self, index: usize) -> f32 {
        match self.input(index) {
            Some(Value::Float(v)) => *v,
            Some(Value::FloatVec(buf)) => buf.sample(0),
            Some(Value::Int(i)) => *i as f32,
            _ => 0.0,
        }
    }

    /// Input `index` as a float vector, if it is one.
    pub fn input_buffer(&self, index: usize) -> Option<&FloatBuffer> {
        self.input(index).and_then(Value::as_buffer)
    }

    /// Input `index` as a string slice; empty for other kinds.
    pub fn input_str(&self, index: usize) -> &str {
        self.input(index).and_then(Value::as_str).unwrap_or("")
    }

    /// Input `index` as a channel array, if it is one.
    pub fn input_channels(&self, index: usize) -> Option<&Channels> {
        self.input(index).and_then(Value::as_channels)
    }

    // --- Outputs ---

    /// Number of output sockets.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Current value of this node's output `index`.
    pub fn output(&self, index: usize) -> Option<&Value> {
        self.outputs.get(index).map(OutputPlug::value)
    }

    /// Replaces output `index`. Returns false, and logs, if the socket is
    /// missing or `value` has the wrong type.
    pub fn set_output(&mut self, index: usize, value: impl Into<Value>) -> bool {
        write_output(self.id, self.outputs, index, value.into())
    }

    /// Writes a scalar to a `float` or `floatvec` output.
    pub fn set_float(&mut self, index: usize, value: f32) -> bool {
        match self.outputs.get(index).map(OutputPlug::plug_type) {
            Some(PlugType::FloatVec) => self.set_output(index, FloatBuffer::Scalar(value)),
            _ => self.set_output(index, value),
        }
    }

    /// Writes a string output in place, reusing its allocation.
    pub fn set_str(&mut self, index: usize, value: &str) -> bool {
        if let Some(Value::String(s)) = self.outputs.get_mut(index).map(OutputPlug::value_mut) {
            s.clear();
            s.push_str(value);
            return true;
        }
        self.set_output(index, value)
    }

    /// Fires trigger output `index`. Receivers linked to it run their
    /// `on_trigger` once this call's node hook returns.
    pub fn fire(&mut self, index: usize) {
        match self.outputs.get(index).map(OutputPlug::plug_type) {
            Some(PlugType::Trigger) => {
                if !self.fired.contains(&index) {
                    self.fired.push(index);
                }
            }
            other => {
                tracing::warn!(
                    node_id = self.id.index(),
                    socket = index,
                    found = ?other,
                    "fire on a non-trigger output"
                );
            }
        }
    }
}

/// View of the graph given to [`Node::init`](crate::Node::init).
pub struct InitContext<'a> {
    pub(crate) id: NodeId,
    pub(crate) description: &'a NodeDescription,
    pub(crate) wiring: Wiring<'a>,
    pub(crate) outputs: &'a mut [OutputPlug],
    pub(crate) shared: &'a SharedState,
}

impl InitContext<'_> {
    /// Identity of the node being initialized.
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// The description record the node was built from.
    pub fn description(&self) -> &NodeDescription {
        self.description
    }

    /// The graph's shared services.
    pub fn shared(&self) -> &SharedState {
        self.shared
    }

    /// Number of input sockets.
    pub fn input_count(&self) -> usize {
        self.wiring.inputs.len()
    }

    /// Number of output sockets.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// True if input `index` reads an output or a literal.
    pub fn is_connected(&self, index: usize) -> bool {
        self.wiring.is_connected(index)
    }

    /// True if input `index` reads another node's output.
    pub fn is_linked(&self, index: usize) -> bool {
        self.wiring.is_linked(index)
    }

    /// Value input `index` would read right now. Linked outputs still hold
    /// their initial values at this point.
    pub fn input(&self, index: usize) -> Option<&Value> {
        self.wiring.resolve(index, &*self.outputs)
    }

    /// Input `index` as a scalar. Float vectors read as their first sample.
    pub fn input_float(&self, index: usize) -> f32 {
        match self.input(index) {
            Some(Value::Float(v)) => *v,
            Some(Value::FloatVec(buf)) => buf.sample(0),
            Some(Value::Int(i)) => *i as f32,
            _ => 0.0,
        }
    }

    /// Input `index` as a string slice; empty for other kinds.
    pub fn input_str(&self, index: usize) -> &str {
        self.input(index).and_then(Value::as_str).unwrap_or("")
    }

    /// Sets the initial value of output `index`.
    pub fn set_output(&mut self, index: usize, value: impl Into<Value>) -> bool {
        write_output(self.id, self.outputs, index, value.into())
    }
}
