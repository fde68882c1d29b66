//! Graph documents and engine configuration for tickgraph.
//!
//! A graph document is a TOML file holding a graph description (nodes, links,
//! literal input values) plus the engine settings a host needs to run it.
//!
//! # Features
//!
//! - **Documents**: load and save [`GraphDocument`] files
//! - **Engine Settings**: tick rate, start paused, trigger depth limit
//! - **Validation**: check a document against a type registry before building
//!
//! # Example
//!
//! ```rust,no_run
//! use tickgraph_config::{GraphDocument, validate_document};
//! use tickgraph_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::with_builtin_types();
//! let doc = GraphDocument::load("blink.toml").unwrap();
//!
//! for issue in validate_document(&doc, &registry) {
//!     eprintln!("{issue}");
//! }
//!
//! let mut outcome = doc.build(&registry).unwrap();
//! outcome.graph.tick(doc.engine.dt());
//! ```

mod document;
mod error;

/// Document validation against a type registry.
pub mod validation;

pub use document::{EngineSettings, GraphDocument};
pub use error::ConfigError;
pub use validation::{ValidationIssue, validate_document};

use tickgraph_registry::TypeRegistry;

/// Loads a document and rejects it if validation finds any issue.
pub fn load_validated(
    path: impl AsRef<std::path::Path>,
    registry: &TypeRegistry,
) -> Result<GraphDocument, ConfigError> {
    let doc = GraphDocument::load(path)?;
    let issues = validate_document(&doc, registry);
    if issues.is_empty() {
        Ok(doc)
    } else {
        Err(ConfigError::Validation(issues))
    }
}
