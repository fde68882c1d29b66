//! Node type listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use tickgraph_registry::{NodeCategory, SocketDescriptor, TypeRegistry};

#[derive(Args)]
pub struct TypesArgs {
    /// Show sockets for a specific type
    #[arg(value_name = "TYPE")]
    name: Option<String>,
}

pub fn run(args: TypesArgs) -> anyhow::Result<()> {
    let registry = TypeRegistry::with_builtin_types();

    if let Some(name) = &args.name {
        let ty = registry
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown node type: {}", name))?;

        let title = format!("{} ({})", ty.id, ty.name);
        println!("{title}");
        println!("{}", "=".repeat(title.len()));
        println!();
        println!("{}", ty.description);
        println!("Category: {}", ty.category.name());
        println!();
        print_sockets("Inputs", &ty.inputs);
        println!();
        print_sockets("Outputs", &ty.outputs);
        return Ok(());
    }

    println!("Available Node Types");
    println!("====================");
    for category in NodeCategory::ALL {
        let types = registry.types_in_category(category);
        if types.is_empty() {
            continue;
        }
        println!();
        println!("{} - {}", category.name(), category.description());
        for ty in types {
            println!("  {:18} {}", ty.id, ty.description);
        }
    }
    println!();
    println!("Use 'tickgraph types <TYPE>' for socket details.");
    Ok(())
}

fn print_sockets(title: &str, sockets: &[SocketDescriptor]) {
    println!("{title}:");
    if sockets.is_empty() {
        println!("  (none)");
        return;
    }
    println!("  {:3}  {:12}  {:9}  {:8}  {}", "#", "Name", "Type", "Default", "Label");
    println!("  {:3}  {:12}  {:9}  {:8}  {}", "-", "----", "----", "-------", "-----");
    for (i, socket) in sockets.iter().enumerate() {
        let mut default = socket.default.unwrap_or("-").to_string();
        if socket.editable {
            default.push('*');
        }
        println!(
            "  {:3}  {:12}  {:9}  {:8}  {}",
            i,
            socket.name,
            socket.plug_type.name(),
            default,
            socket.display_name
        );
    }
}
