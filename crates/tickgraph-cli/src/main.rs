//! tickgraph CLI - inspect node types, validate and run graph documents.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickgraph")]
#[command(author, version, about = "tickgraph node-graph engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered node types and their sockets
    Types(commands::types::TypesArgs),

    /// Check a graph document against the registry
    Validate(commands::validate::ValidateArgs),

    /// Build a graph document and tick it
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so command output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Types(args) => commands::types::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
