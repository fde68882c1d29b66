//! Cycle report over predecessor relations.
//!
//! Cycles are legal (a cycle edge reads last tick's value, see the scheduler
//! docs), but they are usually a wiring mistake, so the builder reports them.

use crate::node::NodeId;

use super::RuntimeGraph;

impl RuntimeGraph {
    /// Nodes that lie on a predecessor cycle, sorted by identity.
    ///
    /// Kahn's algorithm strips every node reachable from a source; the same
    /// pass run backwards over the remainder strips nodes that merely hang off
    /// a cycle. What is left sits on a cycle or between two cycles. Self-links
    /// count as cycles.
    pub fn cyclic_nodes(&self) -> Vec<NodeId> {
        let n = self.nodes.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, slot) in self.nodes.iter().enumerate() {
            for pred in &slot.predecessors {
                successors[pred.index()].push(i);
                in_degree[i] += 1;
            }
        }

        // Forward pass.
        let mut removed = vec![false; n];
        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        while let Some(idx) = queue.pop() {
            removed[idx] = true;
            for &succ in &successors[idx] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push(succ);
                }
            }
        }

        // Backward pass over what remains.
        let mut out_degree = vec![0usize; n];
        for idx in (0..n).filter(|&i| !removed[i]) {
            out_degree[idx] = successors[idx].iter().filter(|&&s| !removed[s]).count();
        }
        let mut queue: Vec<usize> = (0..n)
            .filter(|&i| !removed[i] && out_degree[i] == 0)
            .collect();
        while let Some(idx) = queue.pop() {
            removed[idx] = true;
            for pred in &self.nodes[idx].predecessors {
                let p = pred.index();
                if removed[p] {
                    continue;
                }
                out_degree[p] -= 1;
                if out_degree[p] == 0 {
                    queue.push(p);
                }
            }
        }

        let mut cyclic: Vec<NodeId> = (0..n)
            .filter(|&i| !removed[i])
            .map(|i| self.nodes[i].id)
            .collect();
        cyclic.sort_unstable();
        cyclic
    }
}
