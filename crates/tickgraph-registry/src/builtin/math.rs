//! Scalar arithmetic and clock nodes.

use tickgraph_core::{EvalContext, Node, NodeSummary};

/// Forwards its `value` input to `out`.
#[derive(Debug, Default)]
pub struct Const {
    last: f32,
}

impl Node for Const {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        self.last = ctx.input_float(0);
        ctx.set_float(0, self.last);
    }

    fn describe(&self, summary: &mut NodeSummary) {
        summary.add("value", self.last);
    }
}

/// `out = a + b`. Passthrough forwards `a`.
#[derive(Debug, Default)]
pub struct Add;

impl Node for Add {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let a = ctx.input_float(0);
        let out = if ctx.is_passthrough() {
            a
        } else {
            a + ctx.input_float(1)
        };
        ctx.set_float(0, out);
    }
}

/// `out = a * b`. Passthrough forwards `a`.
#[derive(Debug, Default)]
pub struct Mul;

impl Node for Mul {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let a = ctx.input_float(0);
        let out = if ctx.is_passthrough() {
            a
        } else {
            a * ctx.input_float(1)
        };
        ctx.set_float(0, out);
    }
}

/// Publishes graph time and the tick's dt.
#[derive(Debug, Default)]
pub struct Time;

impl Node for Time {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let time = ctx.time() as f32;
        let dt = ctx.dt();
        ctx.set_float(0, time);
        ctx.set_float(1, dt);
    }
}
