//! Node type registry for tickgraph.
//!
//! This crate maps textual node-type names to a factory function and a socket
//! descriptor. The graph builder looks types up here to instantiate nodes and
//! to resolve socket layouts; editors and tooling use the metadata to build
//! palettes.
//!
//! # Features
//!
//! - **Type Discovery**: list all registered types with metadata
//! - **Factory Pattern**: create node instances by type name at runtime
//! - **Category System**: types organized by role (math, memory, events, ...)
//! - **Socket Info**: per-socket name, type, default literal and display name
//!
//! The registry is an explicit object. It starts empty; each node type is
//! added by a registration call during setup, and entries are never removed.
//!
//! # Example
//!
//! ```rust
//! use tickgraph_registry::{NodeCategory, TypeRegistry};
//!
//! let registry = TypeRegistry::with_builtin_types();
//!
//! for ty in registry.all_types() {
//!     println!("{}: {}", ty.id, ty.description);
//! }
//!
//! let add = registry.get("add").unwrap();
//! assert_eq!(add.inputs.len(), 2);
//! assert!(registry.create("add").is_some());
//!
//! for ty in registry.types_in_category(NodeCategory::Trigger) {
//!     println!("trigger type: {}", ty.id);
//! }
//! ```

pub mod builtin;

use thiserror::Error;
use tickgraph_core::{Node, PlugType};

/// Role of a node type, for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Constants and arithmetic.
    Math,
    /// Memory banks and flags.
    Memory,
    /// Smoothed control values.
    Control,
    /// Graph-level events.
    Event,
    /// Trigger sources and counters.
    Trigger,
    /// Timing and other utilities.
    Utility,
}

impl NodeCategory {
    /// All categories, in display order.
    pub const ALL: [NodeCategory; 6] = [
        NodeCategory::Math,
        NodeCategory::Memory,
        NodeCategory::Control,
        NodeCategory::Event,
        NodeCategory::Trigger,
        NodeCategory::Utility,
    ];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            NodeCategory::Math => "Math",
            NodeCategory::Memory => "Memory",
            NodeCategory::Control => "Control",
            NodeCategory::Event => "Event",
            NodeCategory::Trigger => "Trigger",
            NodeCategory::Utility => "Utility",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            NodeCategory::Math => "Constants and arithmetic on scalars",
            NodeCategory::Memory => "Named memory bank entries and flags",
            NodeCategory::Control => "Smoothed, externally driven control values",
            NodeCategory::Event => "Graph-level events delivered one tick later",
            NodeCategory::Trigger => "Discrete trigger sources and counters",
            NodeCategory::Utility => "Timing and miscellaneous helpers",
        }
    }
}

/// Describes one input or output socket of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketDescriptor {
    /// Name used by graph descriptions to address the socket.
    pub name: &'static str,
    /// Human-readable label.
    pub display_name: &'static str,
    /// Value kind.
    pub plug_type: PlugType,
    /// Literal text used for an unconnected input when the description gives
    /// no value.
    pub default: Option<&'static str>,
    /// Outputs only: an editor may let users type a value into it.
    pub editable: bool,
}

impl SocketDescriptor {
    /// A socket named `name` of kind `plug_type`, labelled with its name.
    pub const fn new(name: &'static str, plug_type: PlugType) -> Self {
        Self {
            name,
            display_name: name,
            plug_type,
            default: None,
            editable: false,
        }
    }

    /// Sets the human-readable label.
    pub const fn with_display_name(mut self, display_name: &'static str) -> Self {
        self.display_name = display_name;
        self
    }

    /// Sets the default literal text.
    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the socket as editable.
    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }
}

/// Describes a node type in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Unique type name used by graph descriptions.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category for organization.
    pub category: NodeCategory,
    /// Input sockets, in index order.
    pub inputs: Vec<SocketDescriptor>,
    /// Output sockets, in index order.
    pub outputs: Vec<SocketDescriptor>,
}

impl TypeDescriptor {
    /// Kinds of the input sockets, in index order.
    pub fn input_types(&self) -> Vec<PlugType> {
        self.inputs.iter().map(|s| s.plug_type).collect()
    }

    /// Kinds of the output sockets, in index order.
    pub fn output_types(&self) -> Vec<PlugType> {
        self.outputs.iter().map(|s| s.plug_type).collect()
    }

    /// Index of the input named `name`.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.name == name)
    }

    /// Index of the output named `name`.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|s| s.name == name)
    }
}

/// Factory function type for creating nodes.
pub type NodeFactory = fn() -> Box<dyn Node>;

/// Errors raised while registering a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A type with this name is already registered.
    #[error("node type '{0}' is already registered")]
    DuplicateType(String),

    /// Two sockets on the same side share a name.
    #[error("node type '{type_name}' declares socket '{socket}' twice")]
    DuplicateSocket {
        /// Type being registered.
        type_name: String,
        /// Repeated socket name.
        socket: String,
    },
}

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: TypeDescriptor,
    factory: NodeFactory,
}

/// Append-only table of node types.
pub struct TypeRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.descriptor.id))
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a registry holding the built-in utility types.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        builtin::register_builtin_types(&mut registry);
        registry
    }

    /// Registers a node type.
    ///
    /// # Errors
    ///
    /// Fails if the type name is taken or if a socket name repeats on the
    /// same side. The registry is unchanged on failure.
    pub fn register(
        &mut self,
        descriptor: TypeDescriptor,
        factory: NodeFactory,
    ) -> Result<(), RegistryError> {
        if self.get(descriptor.id).is_some() {
            return Err(RegistryError::DuplicateType(descriptor.id.to_string()));
        }
        for sockets in [&descriptor.inputs, &descriptor.outputs] {
            for (i, socket) in sockets.iter().enumerate() {
                if sockets[..i].iter().any(|s| s.name == socket.name) {
                    return Err(RegistryError::DuplicateSocket {
                        type_name: descriptor.id.to_string(),
                        socket: socket.name.to_string(),
                    });
                }
            }
        }
        tracing::debug!(type_name = descriptor.id, "node type registered");
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
        Ok(())
    }

    /// Returns descriptors for all registered types, in registration order.
    pub fn all_types(&self) -> Vec<&TypeDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for types in a specific category.
    pub fn types_in_category(&self, category: NodeCategory) -> Vec<&TypeDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by type name.
    pub fn get(&self, id: &str) -> Option<&TypeDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Create a node instance by type name.
    ///
    /// Returns `None` if the type is not registered.
    pub fn create(&self, id: &str) -> Option<Box<dyn Node>> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| (e.factory)())
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
