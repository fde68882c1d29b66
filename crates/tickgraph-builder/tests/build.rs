//! Integration tests for graph construction.
//!
//! Descriptions are built in code and run against the built-in registry, or
//! against small registries of test node types.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use tickgraph_builder::{BuildDiagnostic, BuildError, GraphBuilder, SocketSide, build};
use tickgraph_core::{
    ActiveGraphGuard, EvalContext, GraphDescription, InputSource, LinkDescription, Node,
    NodeDescription, NodeId, PlugType, SharedState, Value,
};
use tickgraph_registry::{NodeCategory, SocketDescriptor, TypeDescriptor, TypeRegistry};

fn float_out(graph: &tickgraph_core::RuntimeGraph, id: u32, socket: usize) -> Option<f32> {
    graph.output(NodeId(id), socket).and_then(Value::as_float)
}

// ============================================================================
// Example scenario
// ============================================================================

static CONST_EVALS: AtomicUsize = AtomicUsize::new(0);

/// `const` with an evaluation counter.
struct CountedConst;

impl Node for CountedConst {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) {
        CONST_EVALS.fetch_add(1, Ordering::SeqCst);
        let v = ctx.input_float(0);
        ctx.set_float(0, v);
    }
}

fn counted_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_builtin_types();
    registry
        .register(
            TypeDescriptor {
                id: "const.counted",
                name: "Counted Constant",
                description: "Constant that counts its evaluations",
                category: NodeCategory::Math,
                inputs: vec![SocketDescriptor::new("value", PlugType::Float).with_default("0")],
                outputs: vec![SocketDescriptor::new("out", PlugType::Float)],
            },
            || Box::new(CountedConst),
        )
        .unwrap();
    registry
}

#[test]
fn const_into_add_with_literal() {
    let registry = counted_registry();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const.counted").with_input("value", "2.5"))
        .with_node(NodeDescription::new(2, "add").with_input("b", "5"))
        .with_link(LinkDescription::wire(1, 1, 0, 2, 0));

    let mut outcome = build(&description, &registry).unwrap();
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert!(outcome.is_complete());

    outcome.graph.tick(1.0 / 60.0);
    assert_eq!(float_out(&outcome.graph, 1, 0), Some(2.5));
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(7.5));
    assert_eq!(CONST_EVALS.load(Ordering::SeqCst), 1);

    outcome.graph.tick(1.0 / 60.0);
    assert_eq!(CONST_EVALS.load(Ordering::SeqCst), 2);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(7.5));
}

// ============================================================================
// Recoverable construction problems
// ============================================================================

#[test]
fn dangling_link_keeps_node_count() {
    let registry = TypeRegistry::with_builtin_types();
    let base = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const"))
        .with_node(NodeDescription::new(2, "add"));
    let dangling = base.clone().with_link(LinkDescription::wire(7, 99, 0, 2, 0));

    let clean = build(&base, &registry).unwrap();
    let broken = build(&dangling, &registry).unwrap();

    assert_eq!(clean.graph.node_count(), broken.graph.node_count());
    assert_eq!(
        broken.diagnostics,
        vec![BuildDiagnostic::MissingEndpoint {
            link: 7,
            node: NodeId(99)
        }]
    );
    assert_eq!(
        broken.graph.predecessors(NodeId(2)),
        Some(Vec::new()),
        "rejected link must not leave a predecessor"
    );
}

#[test]
fn unknown_type_skips_node_and_its_links() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "oscillator"))
        .with_node(NodeDescription::new(2, "add").with_input("b", "1"))
        .with_link(LinkDescription::wire(3, 1, 0, 2, 0));

    let mut outcome = build(&description, &registry).unwrap();
    assert_eq!(outcome.graph.node_count(), 1);
    assert_eq!(
        outcome.diagnostics,
        vec![
            BuildDiagnostic::UnknownType {
                node: NodeId(1),
                type_name: "oscillator".into()
            },
            BuildDiagnostic::MissingEndpoint {
                link: 3,
                node: NodeId(1)
            },
        ]
    );

    // The survivor runs with a default-valued input.
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(1.0));
}

#[test]
fn missing_sockets_are_reported_by_side() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const"))
        .with_node(NodeDescription::new(2, "add"))
        .with_link(LinkDescription::wire(1, 1, 4, 2, 0))
        .with_link(LinkDescription::wire(2, 1, 0, 2, 9));

    let outcome = build(&description, &registry).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![
            BuildDiagnostic::MissingSocket {
                link: 1,
                node: NodeId(1),
                socket: 4,
                side: SocketSide::Output
            },
            BuildDiagnostic::MissingSocket {
                link: 2,
                node: NodeId(2),
                socket: 9,
                side: SocketSide::Input
            },
        ]
    );
}

#[test]
fn mismatched_link_is_dropped() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "flag.read"))
        .with_node(NodeDescription::new(2, "add"))
        .with_link(LinkDescription::wire(5, 1, 0, 2, 0));

    let outcome = build(&description, &registry).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![BuildDiagnostic::TypeMismatch {
            link: 5,
            input: PlugType::Float,
            output: PlugType::Bool
        }]
    );
    // The input fell back to its declared default literal.
    assert_eq!(
        outcome.graph.input_value(NodeId(2), 0),
        Some(Value::Float(0.0))
    );
}

#[test]
fn duplicate_ids_keep_first_entry() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const"))
        .with_node(NodeDescription::new(1, "add"));

    let outcome = build(&description, &registry).unwrap();
    assert_eq!(outcome.graph.node_count(), 1);
    assert_eq!(outcome.graph.type_name(NodeId(1)), Some("const"));
    assert_eq!(
        outcome.diagnostics,
        vec![BuildDiagnostic::DuplicateNode { node: NodeId(1) }]
    );
}

#[test]
fn disabled_entries_are_ignored() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const").with_input("value", "4"))
        .with_node(NodeDescription::new(2, "mul").with_input("a", "3"))
        .with_node(NodeDescription::new(3, "add").with_enabled(false))
        .with_link(LinkDescription::wire(1, 1, 0, 2, 0).with_enabled(false));

    let mut outcome = build(&description, &registry).unwrap();
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(outcome.graph.node_count(), 2);
    assert!(!outcome.graph.contains(NodeId(3)));

    // a comes from the entry, b from the type's default of 1.
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(3.0));
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn linked_input_ignores_named_value() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "const").with_input("value", "2"))
        .with_node(
            NodeDescription::new(2, "add")
                .with_input("a", "100")
                .with_input("b", "1"),
        )
        .with_link(LinkDescription::wire(1, 1, 0, 2, 0));

    let mut outcome = build(&description, &registry).unwrap();
    assert!(matches!(
        outcome.graph.input_source(NodeId(2), 0),
        Some(InputSource::Output { socket: 0, .. })
    ));
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(3.0));
}

#[test]
fn literal_problems_are_diagnosed() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "add").with_input("a", "lots"))
        .with_node(NodeDescription::new(2, "trigger.counter").with_input("increment", "1"))
        .with_node(NodeDescription::new(3, "const").with_input("gain", "2"));

    let outcome = build(&description, &registry).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![
            BuildDiagnostic::MalformedLiteral {
                node: NodeId(1),
                input: "a".into(),
                plug_type: PlugType::Float,
                text: "lots".into()
            },
            BuildDiagnostic::UnsupportedLiteral {
                node: NodeId(2),
                input: "increment".into(),
                plug_type: PlugType::Trigger
            },
            BuildDiagnostic::UnknownInput {
                node: NodeId(3),
                input: "gain".into()
            },
        ]
    );

    // Malformed text still yields a literal of the declared kind.
    assert_eq!(
        outcome.graph.input_value(NodeId(1), 0),
        Some(Value::Float(0.0))
    );
    assert_eq!(
        outcome.graph.input_source(NodeId(2), 0),
        Some(InputSource::Unconnected)
    );
}

// ============================================================================
// Graph-level behavior after construction
// ============================================================================

#[test]
fn cycles_are_reported_and_still_tick() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "add").with_input("b", "1"))
        .with_node(NodeDescription::new(2, "add").with_input("b", "1"))
        .with_link(LinkDescription::wire(1, 1, 0, 2, 0))
        .with_link(LinkDescription::wire(2, 2, 0, 1, 0));

    let mut outcome = build(&description, &registry).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![BuildDiagnostic::Cycle {
            nodes: vec![NodeId(1), NodeId(2)]
        }]
    );
    assert!(outcome.is_complete());

    // Node 1 is claimed first; node 2, pulled by it, reads node 1's
    // previous output.
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(1.0));
    assert_eq!(float_out(&outcome.graph, 1, 0), Some(2.0));
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 2, 0), Some(3.0));
    assert_eq!(float_out(&outcome.graph, 1, 0), Some(4.0));
}

#[test]
fn trigger_links_route_to_receivers() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "trigger.counter"))
        .with_node(NodeDescription::new(2, "trigger.interval").with_input("period", "0.5"))
        .with_link(LinkDescription::wire(1, 2, 0, 1, 0));

    let mut outcome = build(&description, &registry).unwrap();
    let targets = outcome.graph.trigger_targets(NodeId(2)).unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!((targets[0].input, targets[0].output), (0, 0));
    assert_eq!(outcome.graph.predecessors(NodeId(1)), Some(vec![NodeId(2)]));

    for _ in 0..8 {
        outcome.graph.tick(0.25);
    }
    assert_eq!(
        outcome.graph.output(NodeId(1), 0).and_then(Value::as_int),
        Some(4)
    );
}

#[test]
fn second_trigger_link_into_input_replaces_first() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new()
        .with_node(NodeDescription::new(1, "trigger.counter"))
        .with_node(NodeDescription::new(2, "trigger.interval").with_input("period", "0.1"))
        .with_node(NodeDescription::new(3, "trigger.interval").with_input("period", "0.1"))
        .with_link(LinkDescription::wire(1, 2, 0, 1, 0))
        .with_link(LinkDescription::wire(2, 3, 0, 1, 0));

    let mut outcome = build(&description, &registry).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![BuildDiagnostic::InputRelinked {
            link: 2,
            node: NodeId(1),
            socket: 0
        }]
    );
    assert!(!outcome.is_complete());

    let graph = &mut outcome.graph;
    assert!(graph.trigger_targets(NodeId(2)).unwrap().is_empty());
    assert_eq!(graph.trigger_targets(NodeId(3)).unwrap().len(), 1);
    assert_eq!(graph.predecessors(NodeId(1)), Some(vec![NodeId(3)]));

    // Both intervals fire; only the linked one reaches the counter.
    graph.tick(0.1);
    assert_eq!(graph.output(NodeId(1), 0).and_then(Value::as_int), Some(1));
}

#[test]
fn passthrough_and_pause_settings_apply() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new().with_node(
        NodeDescription::new(1, "mul")
            .with_input("a", "3")
            .with_input("b", "7")
            .with_passthrough(true),
    );

    let mut outcome = GraphBuilder::new()
        .with_start_paused(true)
        .with_max_trigger_depth(4)
        .build(&description, &registry)
        .unwrap();
    assert!(outcome.graph.is_paused());
    assert_eq!(outcome.graph.max_trigger_depth(), 4);
    assert_eq!(outcome.graph.is_passthrough(NodeId(1)), Some(true));

    outcome.graph.tick(0.1);
    assert_eq!(outcome.graph.generation(), 0);

    outcome.graph.set_paused(false);
    outcome.graph.tick(0.1);
    assert_eq!(float_out(&outcome.graph, 1, 0), Some(3.0));
}

#[test]
fn init_hooks_see_literals() {
    let registry = TypeRegistry::with_builtin_types();
    let description = GraphDescription::new().with_node(
        NodeDescription::new(1, "control.value")
            .with_input("name", "volume")
            .with_input("default", "0.25"),
    );

    let outcome = build(&description, &registry).unwrap();
    let shared = std::sync::Arc::clone(outcome.graph.shared());
    let cv = shared.find_control_value("volume").unwrap();
    assert_eq!(cv.current(), [0.25, 0.0]);
    assert_eq!(shared.get_numeric("volume"), [0.25, 0.0, 0.0, 0.0]);

    drop(outcome);
    assert!(shared.find_control_value("volume").is_none());
}

#[test]
fn building_inside_an_active_graph_fails() {
    let shared = std::sync::Arc::new(SharedState::new());
    let _guard = ActiveGraphGuard::enter(shared).unwrap();

    let registry = TypeRegistry::with_builtin_types();
    let result = build(&GraphDescription::new(), &registry);
    assert!(matches!(result, Err(BuildError::ActiveGraphNested)));
}

// ============================================================================
// Literal type fidelity
// ============================================================================

struct Sink;

impl Node for Sink {
    fn evaluate(&mut self, _ctx: &mut EvalContext<'_>) {}
}

const SINK_INPUTS: [(&str, PlugType); 7] = [
    ("b", PlugType::Bool),
    ("i", PlugType::Int),
    ("f", PlugType::Float),
    ("v", PlugType::FloatVec),
    ("s", PlugType::String),
    ("t", PlugType::Trigger),
    ("c", PlugType::Channels),
];

fn sink_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptor {
                id: "sink",
                name: "Sink",
                description: "One input of every kind",
                category: NodeCategory::Utility,
                inputs: SINK_INPUTS
                    .iter()
                    .map(|&(name, ty)| SocketDescriptor::new(name, ty))
                    .collect(),
                outputs: vec![],
            },
            || Box::new(Sink),
        )
        .unwrap();
    registry
}

proptest! {
    /// Every literal built for a supported kind has exactly the input's kind;
    /// unsupported kinds get no literal and one diagnostic each.
    #[test]
    fn literal_kind_matches_input_kind(texts in prop::collection::vec("[ -~]{0,12}", 7)) {
        let registry = sink_registry();
        let mut node = NodeDescription::new(1, "sink");
        for ((name, _), text) in SINK_INPUTS.iter().zip(&texts) {
            node = node.with_input(*name, text.as_str());
        }
        let outcome = build(&GraphDescription::new().with_node(node), &registry).unwrap();

        for (index, &(name, ty)) in SINK_INPUTS.iter().enumerate() {
            let source = outcome.graph.input_source(NodeId(1), index);
            if ty.supports_literal() {
                prop_assert!(matches!(source, Some(InputSource::Literal(_))), "{}", name);
                let value = outcome.graph.input_value(NodeId(1), index).unwrap();
                prop_assert_eq!(value.plug_type(), ty);
            } else {
                prop_assert_eq!(source, Some(InputSource::Unconnected));
                let reported = outcome.diagnostics.iter().any(|d| matches!(
                    d,
                    BuildDiagnostic::UnsupportedLiteral { input, .. } if input == name
                ));
                prop_assert!(reported, "{}", name);
            }
        }
        prop_assert_eq!(outcome.graph.literal_count(), 5);
    }
}
