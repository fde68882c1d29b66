//! Graph document validation command.

use clap::Args;
use std::path::PathBuf;
use tickgraph_config::{GraphDocument, validate_document};
use tickgraph_registry::TypeRegistry;

#[derive(Args)]
pub struct ValidateArgs {
    /// Graph document (TOML)
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let registry = TypeRegistry::with_builtin_types();
    let doc = GraphDocument::load(&args.file)?;
    let issues = validate_document(&doc, &registry);

    println!(
        "{}: {} nodes, {} links",
        doc.name,
        doc.nodes.len(),
        doc.links.len()
    );
    if issues.is_empty() {
        println!("OK");
        return Ok(());
    }

    for issue in &issues {
        println!("  - {issue}");
    }
    anyhow::bail!(
        "{} has {} problem(s)",
        args.file.display(),
        issues.len()
    )
}
