//! Integration tests for tickgraph-config.
//!
//! Documents are written to temporary directories, loaded back, validated and
//! built.

use tempfile::TempDir;
use tickgraph_config::{
    ConfigError, EngineSettings, GraphDocument, ValidationIssue, load_validated,
    validate_document,
};
use tickgraph_core::{LinkDescription, NodeDescription, NodeId, Value};
use tickgraph_registry::TypeRegistry;

fn counter_document() -> GraphDocument {
    GraphDocument::new("Counter")
        .with_description("counts interval ticks")
        .with_engine(EngineSettings {
            tick_rate_hz: 4,
            ..EngineSettings::default()
        })
        .with_node(NodeDescription::new(1, "trigger.interval").with_input("period", "0.5"))
        .with_node(NodeDescription::new(2, "trigger.counter"))
        .with_link(LinkDescription::wire(1, 1, 0, 2, 0))
}

#[test]
fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("counter.toml");

    let doc = counter_document();
    doc.save(&path).unwrap();
    assert!(path.exists());

    let loaded = GraphDocument::load(&path).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = GraphDocument::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn loaded_document_builds_and_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("counter.toml");
    counter_document().save(&path).unwrap();

    let registry = TypeRegistry::with_builtin_types();
    let doc = load_validated(&path, &registry).unwrap();
    let mut outcome = doc.build(&registry).unwrap();
    assert!(outcome.diagnostics.is_empty());

    // Four ticks of 0.25 s: two half-second periods.
    for _ in 0..4 {
        outcome.graph.tick(doc.engine.dt());
    }
    assert_eq!(
        outcome.graph.output(NodeId(2), 0).and_then(Value::as_int),
        Some(2)
    );
}

#[test]
fn engine_settings_reach_the_graph() {
    let registry = TypeRegistry::with_builtin_types();
    let doc = counter_document().with_engine(EngineSettings {
        tick_rate_hz: 60,
        start_paused: true,
        max_trigger_depth: 3,
    });
    let outcome = doc.build(&registry).unwrap();
    assert!(outcome.graph.is_paused());
    assert_eq!(outcome.graph.max_trigger_depth(), 3);
}

#[test]
fn invalid_document_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    GraphDocument::new("Bad")
        .with_node(NodeDescription::new(1, "reverb"))
        .save(&path)
        .unwrap();

    let registry = TypeRegistry::with_builtin_types();
    match load_validated(&path, &registry) {
        Err(ConfigError::Validation(issues)) => assert_eq!(
            issues,
            vec![ValidationIssue::UnknownType {
                node: NodeId(1),
                type_name: "reverb".into()
            }]
        ),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn hand_written_document_validates() {
    let text = r#"
name = "Memory"

[[nodes]]
id = 10
type = "memf.write"
[nodes.inputs]
name = "pos"
x = "1.5"

[[nodes]]
id = 11
type = "memf.read"
[nodes.inputs]
name = "pos"
"#;
    let registry = TypeRegistry::with_builtin_types();
    let doc = GraphDocument::from_toml(text).unwrap();
    assert!(validate_document(&doc, &registry).is_empty());

    let mut outcome = doc.build(&registry).unwrap();
    outcome.graph.tick(doc.engine.dt());
    assert_eq!(
        outcome.graph.shared().get_numeric("pos"),
        [1.5, 0.0, 0.0, 0.0]
    );
}
