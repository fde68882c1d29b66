//! Graph run command: build a document and tick it from the command line.

use clap::Args;
use std::path::PathBuf;
use tickgraph_config::{GraphDocument, validate_document};
use tickgraph_core::RuntimeGraph;
use tickgraph_registry::TypeRegistry;

#[derive(Args)]
pub struct RunArgs {
    /// Graph document (TOML)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Number of ticks (default: one second at the document's tick rate)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Seconds per tick (default: 1 / tick_rate_hz)
    #[arg(long)]
    dt: Option<f32>,

    /// Set a control value before the first tick (NAME=X or NAME=X,Y)
    #[arg(long = "set", value_name = "NAME=X[,Y]")]
    controls: Vec<String>,

    /// Raise a graph event before the first tick (repeatable)
    #[arg(long = "event", value_name = "NAME")]
    events: Vec<String>,

    /// Run even if the document asks to start paused
    #[arg(long)]
    resume: bool,

    /// Print shared state and node summaries after the run
    #[arg(long)]
    dump: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let registry = TypeRegistry::with_builtin_types();
    let doc = GraphDocument::load(&args.file)?;

    for issue in validate_document(&doc, &registry) {
        tracing::warn!(%issue, "document issue");
    }

    let mut outcome = doc.build(&registry)?;
    if !outcome.diagnostics.is_empty() {
        println!("Build diagnostics:");
        for diagnostic in &outcome.diagnostics {
            println!("  - {diagnostic}");
        }
        println!();
    }

    let graph = &mut outcome.graph;
    if args.resume {
        graph.set_paused(false);
    }

    for spec in &args.controls {
        let (name, x, y) = parse_control(spec)?;
        graph.shared().set_control_value(name, x, y)?;
    }
    for event in &args.events {
        graph.shared().trigger_graph_event(event);
    }

    let dt = args.dt.unwrap_or_else(|| doc.engine.dt());
    let ticks = args
        .ticks
        .unwrap_or_else(|| u64::from(doc.engine.tick_rate_hz.max(1)));
    if graph.is_paused() {
        println!("Graph is paused; pass --resume to tick it.");
    }

    tracing::info!(ticks, dt, "running {}", doc.name);
    for _ in 0..ticks {
        graph.tick(dt);
    }

    println!(
        "{}: generation {}, time {:.3}s, {} nodes",
        doc.name,
        graph.generation(),
        graph.time(),
        graph.node_count()
    );
    print_outputs(graph);

    if args.dump {
        println!();
        dump(graph);
    }
    Ok(())
}

/// Splits `NAME=X` or `NAME=X,Y`.
fn parse_control(spec: &str) -> anyhow::Result<(&str, f32, f32)> {
    let (name, values) = spec
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected NAME=X[,Y], got '{}'", spec))?;
    let mut parts = values.split(',').map(str::trim);
    let x: f32 = parts.next().unwrap_or_default().parse()?;
    let y: f32 = match parts.next() {
        Some(text) => text.parse()?,
        None => 0.0,
    };
    if parts.next().is_some() {
        anyhow::bail!("at most two values allowed in '{}'", spec);
    }
    Ok((name.trim(), x, y))
}

fn print_outputs(graph: &RuntimeGraph) {
    let mut ids: Vec<_> = graph.node_ids().collect();
    ids.sort();
    for id in ids {
        let type_name = graph.type_name(id).unwrap_or("?");
        let count = graph.output_count(id).unwrap_or(0);
        let values: Vec<String> = (0..count)
            .filter_map(|socket| graph.output(id, socket))
            .map(ToString::to_string)
            .collect();
        println!("  {:>4}  {:18} {}", id.index(), type_name, values.join(", "));
    }
}

fn dump(graph: &RuntimeGraph) {
    let snapshot = graph.shared().snapshot();

    println!("Control values:");
    for cv in &snapshot.control_values {
        let [x, y] = cv.current();
        println!(
            "  {:16} current ({x:.4}, {y:.4})  desired {:?}  refs {}",
            cv.name(),
            cv.desired(),
            cv.ref_count()
        );
    }
    println!("Numeric memory:");
    for (name, value) in &snapshot.numeric {
        println!("  {name:16} {value:?}");
    }
    println!("String memory:");
    for (name, value) in &snapshot.strings {
        println!("  {name:16} {value:?}");
    }
    println!("Flags: {}", snapshot.flags.join(", "));
    println!("Active events: {}", snapshot.active_events.join(", "));
    println!("Pending events: {}", snapshot.pending_events.join(", "));
    println!("Registered events: {}", snapshot.registered_events.join(", "));

    let mut ids: Vec<_> = graph.node_ids().collect();
    ids.sort();
    for id in ids {
        let Some(summary) = graph.describe_node(id) else {
            continue;
        };
        if summary.is_empty() {
            continue;
        }
        println!();
        println!("{id} ({}):", graph.type_name(id).unwrap_or("?"));
        for line in summary.lines() {
            println!("  {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_control;

    #[test]
    fn control_specs() {
        assert_eq!(parse_control("gain=0.5").unwrap(), ("gain", 0.5, 0.0));
        assert_eq!(parse_control("pos = 1, 2").unwrap(), ("pos", 1.0, 2.0));
        assert!(parse_control("gain").is_err());
        assert!(parse_control("gain=x").is_err());
        assert!(parse_control("gain=1,2,3").is_err());
    }
}
