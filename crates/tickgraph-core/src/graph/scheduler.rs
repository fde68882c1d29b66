//! Tick scheduler: generation-guarded, pull-based evaluation.
//!
//! Every tick bumps the graph-wide generation. Each node is then *ensured*:
//! if it has not been claimed for this generation it is claimed, its
//! predecessors are ensured depth-first, and only then is it evaluated. A node
//! therefore runs at most once per tick no matter how many predecessor lists
//! name it, and arena order does not affect results.
//!
//! A node is claimed before its predecessors are visited. On a cycle the walk
//! reaches a node that is already claimed but not yet evaluated; that edge
//! reads the value left from the previous tick.

use std::sync::Arc;

use crate::active::ActiveGraphGuard;
use crate::context::{EvalContext, Wiring};
use crate::node::{Node, NodeHandle};

use super::RuntimeGraph;

impl RuntimeGraph {
    /// Advances the graph by one frame of `dt` seconds.
    ///
    /// Order of work:
    /// 1. pending graph events become active, control values are smoothed and
    ///    exported to the numeric bank (one lock acquisition)
    /// 2. the generation counter is incremented
    /// 3. every node is ensured, in arena order
    /// 4. graph time advances by `dt`
    ///
    /// Does nothing while the graph is paused. Not reentrant.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            tracing::trace!("tick skipped, graph paused");
            return;
        }

        let guard = ActiveGraphGuard::enter(Arc::clone(&self.shared));
        debug_assert!(
            guard.is_ok(),
            "another graph is already active on this thread"
        );
        if let Err(err) = &guard {
            tracing::error!(%err, "ticking without publishing the active graph");
        }

        self.shared.begin_tick(dt);
        self.generation += 1;
        self.dt = dt;
        tracing::trace!(generation = self.generation, dt, "tick");

        for index in 0..self.nodes.len() {
            self.ensure_current(NodeHandle(index as u32));
        }

        self.time += f64::from(dt);
        drop(guard);
    }

    /// Makes sure `root` and everything it pulls from has run this tick.
    fn ensure_current(&mut self, root: NodeHandle) {
        let generation = self.generation;
        if self.nodes[root.index()].last_generation == generation {
            return;
        }

        let mut stack = core::mem::take(&mut self.visit_stack);
        self.nodes[root.index()].last_generation = generation;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let handle = top.0;
            if let Some(&pred) = self.nodes[handle.index()].predecessors.get(top.1) {
                top.1 += 1;
                let pred_slot = &mut self.nodes[pred.index()];
                if pred_slot.last_generation != generation {
                    pred_slot.last_generation = generation;
                    stack.push((pred, 0));
                }
            } else {
                stack.pop();
                self.evaluate_node(handle);
            }
        }

        self.visit_stack = stack;
    }

    fn evaluate_node(&mut self, handle: NodeHandle) {
        let fired = self.run_node(handle, |node, ctx| node.evaluate(ctx));
        if !fired.is_empty() {
            self.dispatch_triggers(handle, fired, 0);
        }
    }

    /// Runs one node hook with a fresh evaluation context and returns the
    /// trigger outputs it fired.
    pub(super) fn run_node(
        &mut self,
        handle: NodeHandle,
        hook: impl FnOnce(&mut dyn Node, &mut EvalContext<'_>),
    ) -> Vec<usize> {
        let h = handle.index();
        let mut own = core::mem::take(&mut self.outputs[h]);
        let mut fired = Vec::new();
        {
            let slot = &mut self.nodes[h];
            let mut ctx = EvalContext {
                id: slot.id,
                wiring: Wiring {
                    handle,
                    inputs: &slot.inputs,
                    outputs: &self.outputs,
                    literals: &self.literals,
                },
                outputs: &mut own,
                shared: &self.shared,
                fired: &mut fired,
                dt: self.dt,
                time: self.time,
                generation: self.generation,
                passthrough: slot.passthrough,
            };
            hook(slot.node.as_mut(), &mut ctx);
        }
        self.outputs[h] = own;
        fired
    }
}
