//! Trigger router: synchronous delivery of discrete events along trigger links.
//!
//! When a node fires a trigger output from `evaluate` or `on_trigger`, every
//! receiver linked to that output gets `on_trigger` as soon as the firing hook
//! returns, in link order. Receivers may fire in turn; chains deeper than the
//! graph's `max_trigger_depth` are cut off with a warning.

use crate::node::{NodeHandle, TriggerEvent};

use super::RuntimeGraph;

impl RuntimeGraph {
    pub(super) fn dispatch_triggers(&mut self, source: NodeHandle, fired: Vec<usize>, depth: usize) {
        let source_id = self.nodes[source.index()].id;

        for output in fired {
            if let Some(plug) = self.outputs[source.index()].get_mut(output) {
                plug.mark_fired(self.generation);
            }
            tracing::trace!(node_id = source_id.index(), socket = output, depth, "trigger fired");

            let target_count = self.nodes[source.index()].trigger_targets.len();
            for i in 0..target_count {
                let target = self.nodes[source.index()].trigger_targets[i];
                if target.output != output {
                    continue;
                }
                if depth >= self.max_trigger_depth {
                    tracing::warn!(
                        node_id = source_id.index(),
                        socket = output,
                        depth,
                        "trigger chain too deep, dropping delivery"
                    );
                    continue;
                }

                let event = TriggerEvent {
                    input: target.input,
                    source: source_id,
                    source_output: output,
                };
                let chained = self.run_node(target.receiver, |node, ctx| node.on_trigger(event, ctx));
                if !chained.is_empty() {
                    self.dispatch_triggers(target.receiver, chained, depth + 1);
                }
            }
        }
    }
}
