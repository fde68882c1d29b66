//! Nodes backed by the graph's shared state: memory banks, flags and control
//! values.

use tickgraph_core::{
    ControlValueSpec, EvalContext, InitContext, Node, NodeSummary, SharedState, TriggerEvent,
};

/// Reads a four-float entry from the numeric bank. Missing names read zeros.
#[derive(Debug, Default)]
pub struct MemfRead;

impl Node for MemfRead {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let value = ctx.shared().get_numeric(ctx.input_str(0));
        for (i, v) in value.into_iter().enumerate() {
            ctx.set_float(i, v);
        }
    }
}

/// Writes its four float inputs to the numeric bank. Skipped while bypassed
/// or when the name is empty.
#[derive(Debug, Default)]
pub struct MemfWrite;

impl Node for MemfWrite {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let name = ctx.input_str(0);
        if ctx.is_passthrough() || name.is_empty() {
            return;
        }
        let value = [
            ctx.input_float(1),
            ctx.input_float(2),
            ctx.input_float(3),
            ctx.input_float(4),
        ];
        ctx.shared().set_numeric(name, value);
    }
}

/// Reads an entry from the string bank. Missing names read empty.
#[derive(Debug, Default)]
pub struct MemsRead;

impl Node for MemsRead {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let value = ctx.shared().get_string(ctx.input_str(0));
        ctx.set_str(0, &value);
    }
}

/// Writes its string input to the string bank. Skipped while bypassed or
/// when the name is empty.
#[derive(Debug, Default)]
pub struct MemsWrite;

impl Node for MemsWrite {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let name = ctx.input_str(0);
        if ctx.is_passthrough() || name.is_empty() {
            return;
        }
        ctx.shared().set_string(name, ctx.input_str(1));
    }
}

/// Mirrors its `value` input into a named flag whenever the input changes.
/// A trigger on `reset` clears the flag.
#[derive(Debug, Default)]
pub struct FlagSet {
    last: Option<bool>,
}

impl FlagSet {
    const RESET: usize = 2;
}

impl Node for FlagSet {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let name = ctx.input_str(0);
        let value = ctx.input_bool(1);
        if name.is_empty() || self.last == Some(value) {
            return;
        }
        ctx.shared().set_flag(name, value);
        self.last = Some(value);
    }

    fn on_trigger(&mut self, event: TriggerEvent, ctx: &mut EvalContext<'_>) {
        if event.input == Self::RESET {
            ctx.shared().reset_flag(ctx.input_str(0));
        }
    }

    fn describe(&self, summary: &mut NodeSummary) {
        match self.last {
            Some(value) => summary.add("last written", value),
            None => summary.add("last written", "-"),
        }
    }
}

/// Reports whether a named flag is set.
#[derive(Debug, Default)]
pub struct FlagRead;

impl Node for FlagRead {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let set = ctx.shared().is_flag_set(ctx.input_str(0));
        ctx.set_output(0, set);
    }
}

/// Owns one reference to a named control value for the node's lifetime and
/// outputs its smoothed pair.
///
/// The bounds, smoothness and default are read once, at init.
#[derive(Debug, Default)]
pub struct ControlValueNode {
    name: Option<String>,
    spec: ControlValueSpec,
    current: [f32; 2],
}

impl Node for ControlValueNode {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        let name = ctx.input_str(0);
        if name.is_empty() {
            tracing::warn!(node_id = ctx.node_id().index(), "control value without a name");
            return;
        }
        let spec = ControlValueSpec::scalar(
            ctx.input_float(1),
            ctx.input_float(2),
            ctx.input_float(3),
            ctx.input_float(4),
        );
        let name = name.to_string();
        ctx.shared().register_control_value(&name, spec);
        self.current = ctx
            .shared()
            .find_control_value(&name)
            .map_or(spec.default, |cv| cv.current());
        ctx.set_output(0, self.current[0]);
        ctx.set_output(1, self.current[1]);
        self.spec = spec;
        self.name = Some(name);
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let Some(name) = &self.name else {
            return;
        };
        if let Some(cv) = ctx.shared().find_control_value(name) {
            self.current = cv.current();
        }
        ctx.set_float(0, self.current[0]);
        ctx.set_float(1, self.current[1]);
    }

    fn shut(&mut self, shared: &SharedState) {
        if let Some(name) = self.name.take() {
            // Unknown names are already logged by the shared state.
            let _ = shared.unregister_control_value(&name);
        }
    }

    fn describe(&self, summary: &mut NodeSummary) {
        summary.add("name", self.name.as_deref().unwrap_or("-"));
        summary.add("range", format!("{}..{}", self.spec.min, self.spec.max));
        summary.add("smoothness", self.spec.smoothness);
        summary.add("current", format!("{:.3}, {:.3}", self.current[0], self.current[1]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickgraph_core::{NodeDescription, NodeId, PlugType, RuntimeGraph, Value};

    fn single(
        node: Box<dyn Node>,
        inputs: &[PlugType],
        outputs: &[PlugType],
        literals: &[(usize, Value)],
    ) -> RuntimeGraph {
        let mut graph = RuntimeGraph::new();
        graph.add_node(NodeId(1), "test", node, inputs, outputs).unwrap();
        for (socket, value) in literals {
            graph.attach_literal(NodeId(1), *socket, value.clone()).unwrap();
        }
        graph
            .init_node(NodeId(1), &NodeDescription::new(1, "test"))
            .unwrap();
        graph
    }

    #[test]
    fn memf_write_then_read() {
        let mut graph = single(
            Box::new(MemfWrite),
            &[PlugType::String, PlugType::Float, PlugType::Float, PlugType::Float, PlugType::Float],
            &[],
            &[(0, Value::from("pos")), (1, Value::Float(1.0)), (4, Value::Float(4.0))],
        );
        graph.tick(0.1);
        assert_eq!(graph.shared().get_numeric("pos"), [1.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn memf_write_bypassed() {
        let mut graph = single(
            Box::new(MemfWrite),
            &[PlugType::String, PlugType::Float, PlugType::Float, PlugType::Float, PlugType::Float],
            &[],
            &[(0, Value::from("pos")), (1, Value::Float(1.0))],
        );
        graph.set_passthrough(NodeId(1), true).unwrap();
        graph.tick(0.1);
        assert!(!graph.shared().snapshot().numeric.iter().any(|(k, _)| k == "pos"));
    }

    #[test]
    fn memf_read_missing_is_zero() {
        let mut graph = single(
            Box::new(MemfRead),
            &[PlugType::String],
            &[PlugType::Float; 4],
            &[(0, Value::from("absent"))],
        );
        graph.shared().set_numeric("other", [9.0; 4]);
        graph.tick(0.1);
        for i in 0..4 {
            assert_eq!(graph.output(NodeId(1), i).and_then(Value::as_float), Some(0.0));
        }
    }

    #[test]
    fn mems_read_tracks_host_writes() {
        let mut graph = single(
            Box::new(MemsRead),
            &[PlugType::String],
            &[PlugType::String],
            &[(0, Value::from("title"))],
        );
        graph.shared().set_string("title", "intro");
        graph.tick(0.1);
        assert_eq!(graph.output(NodeId(1), 0).and_then(Value::as_str), Some("intro"));
        graph.shared().set_string("title", "outro");
        graph.tick(0.1);
        assert_eq!(graph.output(NodeId(1), 0).and_then(Value::as_str), Some("outro"));
    }

    #[test]
    fn mems_write_then_read() {
        let mut graph = single(
            Box::new(MemsWrite),
            &[PlugType::String, PlugType::String],
            &[],
            &[(0, Value::from("title")), (1, Value::from("credits"))],
        );
        graph.tick(0.1);
        assert_eq!(graph.shared().get_string("title"), "credits");

        graph.set_passthrough(NodeId(1), true).unwrap();
        graph.shared().set_string("title", "host");
        graph.tick(0.1);
        assert_eq!(graph.shared().get_string("title"), "host");
    }

    #[test]
    fn flag_set_writes_on_change_only() {
        let mut graph = single(
            Box::new(FlagSet::default()),
            &[PlugType::String, PlugType::Bool, PlugType::Trigger],
            &[],
            &[(0, Value::from("armed")), (1, Value::Bool(true))],
        );
        graph.tick(0.1);
        assert!(graph.shared().is_flag_set("armed"));

        // Unchanged input does not overwrite a host reset.
        graph.shared().reset_flag("armed");
        graph.tick(0.1);
        assert!(!graph.shared().is_flag_set("armed"));
    }

    #[test]
    fn control_value_lifetime_follows_node() {
        let mut graph = single(
            Box::new(ControlValueNode::default()),
            &[PlugType::String, PlugType::Float, PlugType::Float, PlugType::Float, PlugType::Float],
            &[PlugType::Float; 2],
            &[
                (0, Value::from("gain")),
                (1, Value::Float(0.0)),
                (2, Value::Float(10.0)),
                (3, Value::Float(0.5)),
                (4, Value::Float(2.0)),
            ],
        );
        let shared = std::sync::Arc::clone(graph.shared());
        assert_eq!(shared.get_numeric("gain")[0], 2.0);

        shared.set_control_value("gain", 4.0, 0.0).unwrap();
        graph.tick(1.0);
        assert_eq!(graph.output(NodeId(1), 0).and_then(Value::as_float), Some(3.0));

        let summary = graph.describe_node(NodeId(1)).unwrap();
        assert_eq!(summary.lines()[0], "name: gain");

        drop(graph);
        assert!(shared.find_control_value("gain").is_none());
    }
}
