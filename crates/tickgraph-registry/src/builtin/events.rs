//! Graph-event and trigger-source nodes.

use tickgraph_core::{EvalContext, InitContext, Node, NodeSummary, SharedState, TriggerEvent};

// --- Graph events ---

/// Watches one graph event. `active` is true during the tick the event is
/// active, and `fired` fires once in that tick.
#[derive(Debug, Default)]
pub struct EventListen {
    name: Option<String>,
}

impl Node for EventListen {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        let name = ctx.input_str(0);
        if name.is_empty() {
            return;
        }
        let name = name.to_string();
        ctx.shared().register_event(&name);
        self.name = Some(name);
    }

    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let active = self
            .name
            .as_deref()
            .is_some_and(|name| ctx.shared().is_event_active(name));
        ctx.set_output(0, active);
        if active {
            ctx.fire(1);
        }
    }

    fn shut(&mut self, shared: &SharedState) {
        if let Some(name) = self.name.take() {
            let _ = shared.unregister_event(&name);
        }
    }

    fn describe(&self, summary: &mut NodeSummary) {
        summary.add("event", self.name.as_deref().unwrap_or("-"));
    }
}

/// Queues a graph event when its `emit` input is triggered or when `when`
/// goes from false to true.
#[derive(Debug, Default)]
pub struct EventEmit {
    was_high: bool,
}

impl EventEmit {
    const EMIT: usize = 1;

    fn emit(ctx: &EvalContext<'_>) {
        let name = ctx.input_str(0);
        if !name.is_empty() {
            ctx.shared().trigger_graph_event(name);
        }
    }
}

impl Node for EventEmit {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let high = ctx.input_bool(2);
        if high && !self.was_high {
            Self::emit(ctx);
        }
        self.was_high = high;
    }

    fn on_trigger(&mut self, event: TriggerEvent, ctx: &mut EvalContext<'_>) {
        if event.input == Self::EMIT {
            Self::emit(ctx);
        }
    }
}

// --- Trigger sources ---

/// Fires `tick` once every `period` seconds of accumulated dt and reports
/// the position inside the current period as `phase` in `[0, 1)`.
///
/// A period of zero or less never fires.
#[derive(Debug, Default)]
pub struct TriggerInterval {
    elapsed: f32,
    fired: u64,
}

impl Node for TriggerInterval {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        let period = ctx.input_float(0);
        if period <= 0.0 {
            self.elapsed = 0.0;
            ctx.set_float(1, 0.0);
            return;
        }

        self.elapsed += ctx.dt();
        if self.elapsed >= period {
            // At most one fire per tick, even if dt spans several periods.
            self.elapsed %= period;
            self.fired += 1;
            ctx.fire(0);
        }
        ctx.set_float(1, self.elapsed / period);
    }

    fn describe(&self, summary: &mut NodeSummary) {
        summary.add("elapsed", self.elapsed);
        summary.add("fired", self.fired);
    }
}

/// Counts triggers on `increment`; a trigger on `reset` returns to zero.
#[derive(Debug, Default)]
pub struct TriggerCounter {
    count: i32,
}

impl TriggerCounter {
    const INCREMENT: usize = 0;
    const RESET: usize = 1;
}

impl Node for TriggerCounter {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        ctx.set_output(0, self.count);
    }

    fn on_trigger(&mut self, event: TriggerEvent, ctx: &mut EvalContext<'_>) {
        match event.input {
            Self::INCREMENT => self.count = self.count.saturating_add(1),
            Self::RESET => self.count = 0,
            _ => return,
        }
        ctx.set_output(0, self.count);
    }

    fn describe(&self, summary: &mut NodeSummary) {
        summary.add("count", self.count);
    }
}
