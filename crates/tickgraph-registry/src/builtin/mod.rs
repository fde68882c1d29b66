//! Built-in utility node types.
//!
//! These are small nodes that exercise the engine's services: arithmetic on
//! scalars, memory bank and flag access, control values, graph events and
//! trigger sources. Signal-processing or drawing nodes are not part of this
//! set.
//!
//! | Type | Inputs | Outputs |
//! |------|--------|---------|
//! | `const` | value | out |
//! | `add` | a, b | out |
//! | `mul` | a, b | out |
//! | `memf.read` | name | x, y, z, w |
//! | `memf.write` | name, x, y, z, w | |
//! | `mems.read` | name | value |
//! | `mems.write` | name, value | |
//! | `flag.set` | name, value, reset | |
//! | `flag.read` | name | set |
//! | `control.value` | name, min, max, smoothness, default | x, y |
//! | `event.listen` | name | active, fired |
//! | `event.emit` | name, emit, when | |
//! | `trigger.interval` | period | tick, phase |
//! | `trigger.counter` | increment, reset | count |
//! | `time` | | time, dt |

mod events;
mod math;
mod memory;

pub use events::{EventEmit, EventListen, TriggerCounter, TriggerInterval};
pub use math::{Add, Const, Mul, Time};
pub use memory::{
    ControlValueNode, FlagRead, FlagSet, MemfRead, MemfWrite, MemsRead, MemsWrite,
};

use tickgraph_core::PlugType;

use crate::{NodeCategory, NodeFactory, SocketDescriptor, TypeDescriptor, TypeRegistry};

/// Registers every built-in type. Names already taken are skipped with a
/// warning.
pub fn register_builtin_types(registry: &mut TypeRegistry) {
    use PlugType::{Bool, Float, Int, String, Trigger};

    let types: [(TypeDescriptor, NodeFactory); 15] = [
        // Math
        (
            TypeDescriptor {
                id: "const",
                name: "Constant",
                description: "Outputs its value input unchanged",
                category: NodeCategory::Math,
                inputs: vec![SocketDescriptor::new("value", Float).with_default("0")],
                outputs: vec![SocketDescriptor::new("out", Float).editable()],
            },
            || Box::new(Const::default()),
        ),
        (
            TypeDescriptor {
                id: "add",
                name: "Add",
                description: "Sum of two scalars; passthrough forwards a",
                category: NodeCategory::Math,
                inputs: vec![
                    SocketDescriptor::new("a", Float).with_default("0"),
                    SocketDescriptor::new("b", Float).with_default("0"),
                ],
                outputs: vec![SocketDescriptor::new("out", Float)],
            },
            || Box::new(Add),
        ),
        (
            TypeDescriptor {
                id: "mul",
                name: "Multiply",
                description: "Product of two scalars; passthrough forwards a",
                category: NodeCategory::Math,
                inputs: vec![
                    SocketDescriptor::new("a", Float).with_default("0"),
                    SocketDescriptor::new("b", Float).with_default("1"),
                ],
                outputs: vec![SocketDescriptor::new("out", Float)],
            },
            || Box::new(Mul),
        ),
        // Memory
        (
            TypeDescriptor {
                id: "memf.read",
                name: "Read Numeric Memory",
                description: "Reads a four-float entry from the numeric bank",
                category: NodeCategory::Memory,
                inputs: vec![SocketDescriptor::new("name", String)],
                outputs: vec![
                    SocketDescriptor::new("x", Float),
                    SocketDescriptor::new("y", Float),
                    SocketDescriptor::new("z", Float),
                    SocketDescriptor::new("w", Float),
                ],
            },
            || Box::new(MemfRead),
        ),
        (
            TypeDescriptor {
                id: "memf.write",
                name: "Write Numeric Memory",
                description: "Writes a four-float entry to the numeric bank every tick",
                category: NodeCategory::Memory,
                inputs: vec![
                    SocketDescriptor::new("name", String),
                    SocketDescriptor::new("x", Float).with_default("0"),
                    SocketDescriptor::new("y", Float).with_default("0"),
                    SocketDescriptor::new("z", Float).with_default("0"),
                    SocketDescriptor::new("w", Float).with_default("0"),
                ],
                outputs: vec![],
            },
            || Box::new(MemfWrite),
        ),
        (
            TypeDescriptor {
                id: "mems.read",
                name: "Read String Memory",
                description: "Reads an entry from the string bank",
                category: NodeCategory::Memory,
                inputs: vec![SocketDescriptor::new("name", String)],
                outputs: vec![SocketDescriptor::new("value", String)],
            },
            || Box::new(MemsRead),
        ),
        (
            TypeDescriptor {
                id: "mems.write",
                name: "Write String Memory",
                description: "Writes an entry to the string bank every tick",
                category: NodeCategory::Memory,
                inputs: vec![
                    SocketDescriptor::new("name", String),
                    SocketDescriptor::new("value", String),
                ],
                outputs: vec![],
            },
            || Box::new(MemsWrite),
        ),
        (
            TypeDescriptor {
                id: "flag.set",
                name: "Set Flag",
                description: "Sets or clears a named flag when its value input changes",
                category: NodeCategory::Memory,
                inputs: vec![
                    SocketDescriptor::new("name", String),
                    SocketDescriptor::new("value", Bool).with_default("true"),
                    SocketDescriptor::new("reset", Trigger),
                ],
                outputs: vec![],
            },
            || Box::new(FlagSet::default()),
        ),
        (
            TypeDescriptor {
                id: "flag.read",
                name: "Read Flag",
                description: "Reports whether a named flag is set",
                category: NodeCategory::Memory,
                inputs: vec![SocketDescriptor::new("name", String)],
                outputs: vec![SocketDescriptor::new("set", Bool)],
            },
            || Box::new(FlagRead),
        ),
        // Control
        (
            TypeDescriptor {
                id: "control.value",
                name: "Control Value",
                description: "Registers a smoothed control value and outputs its current pair",
                category: NodeCategory::Control,
                inputs: vec![
                    SocketDescriptor::new("name", String),
                    SocketDescriptor::new("min", Float).with_default("0"),
                    SocketDescriptor::new("max", Float).with_default("1"),
                    SocketDescriptor::new("smoothness", Float).with_default("0.2"),
                    SocketDescriptor::new("default", Float).with_default("0"),
                ],
                outputs: vec![
                    SocketDescriptor::new("x", Float),
                    SocketDescriptor::new("y", Float),
                ],
            },
            || Box::new(ControlValueNode::default()),
        ),
        // Events
        (
            TypeDescriptor {
                id: "event.listen",
                name: "Listen For Event",
                description: "Reports a graph event during the tick it is active and fires on it",
                category: NodeCategory::Event,
                inputs: vec![SocketDescriptor::new("name", String)],
                outputs: vec![
                    SocketDescriptor::new("active", Bool),
                    SocketDescriptor::new("fired", Trigger),
                ],
            },
            || Box::new(EventListen::default()),
        ),
        (
            TypeDescriptor {
                id: "event.emit",
                name: "Emit Event",
                description: "Raises a graph event on trigger or on a rising edge of when",
                category: NodeCategory::Event,
                inputs: vec![
                    SocketDescriptor::new("name", String),
                    SocketDescriptor::new("emit", Trigger),
                    SocketDescriptor::new("when", Bool).with_default("false"),
                ],
                outputs: vec![],
            },
            || Box::new(EventEmit::default()),
        ),
        // Triggers
        (
            TypeDescriptor {
                id: "trigger.interval",
                name: "Interval",
                description: "Fires once every period seconds of graph time",
                category: NodeCategory::Trigger,
                inputs: vec![
                    SocketDescriptor::new("period", Float)
                        .with_default("1")
                        .with_display_name("Period (s)"),
                ],
                outputs: vec![
                    SocketDescriptor::new("tick", Trigger),
                    SocketDescriptor::new("phase", Float),
                ],
            },
            || Box::new(TriggerInterval::default()),
        ),
        (
            TypeDescriptor {
                id: "trigger.counter",
                name: "Counter",
                description: "Counts increment triggers until reset",
                category: NodeCategory::Trigger,
                inputs: vec![
                    SocketDescriptor::new("increment", Trigger),
                    SocketDescriptor::new("reset", Trigger),
                ],
                outputs: vec![SocketDescriptor::new("count", Int)],
            },
            || Box::new(TriggerCounter::default()),
        ),
        // Utility
        (
            TypeDescriptor {
                id: "time",
                name: "Time",
                description: "Graph time and the current tick's dt",
                category: NodeCategory::Utility,
                inputs: vec![],
                outputs: vec![
                    SocketDescriptor::new("time", Float),
                    SocketDescriptor::new("dt", Float),
                ],
            },
            || Box::new(Time),
        ),
    ];

    for (descriptor, factory) in types {
        if let Err(err) = registry.register(descriptor, factory) {
            tracing::warn!(%err, "skipping built-in type");
        }
    }
}
