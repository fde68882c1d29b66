//! Graph construction for tickgraph.
//!
//! [`GraphBuilder`] turns a [`GraphDescription`](tickgraph_core::GraphDescription)
//! into a [`RuntimeGraph`](tickgraph_core::RuntimeGraph), instantiating node
//! types from a [`TypeRegistry`](tickgraph_registry::TypeRegistry).
//!
//! Construction never fails on bad input. Unknown types, dangling links,
//! missing sockets and unparsable literals each drop the offending item and
//! produce a [`BuildDiagnostic`]; the resulting graph is incomplete but
//! runs. The only hard failure is [`BuildError::ActiveGraphNested`].
//!
//! ## Passes
//!
//! 1. **Nodes**: every enabled entry whose type is registered is created
//!    and added under its id; its passthrough flag is applied.
//! 2. **Links**: every enabled link is connected, consumer input to producer
//!    output. Each success records a predecessor and, for trigger outputs, a
//!    trigger target on the producer.
//! 3. **Literals**: each still-unconnected input gets a literal parsed from
//!    the entry's named value, or from the type's declared default.
//! 4. **Init**: each node's init hook runs with its description entry.
//!
//! Cycles are allowed; they are reported as [`BuildDiagnostic::Cycle`].

mod builder;
mod diagnostic;

pub use builder::{BuildOutcome, GraphBuilder, build};
pub use diagnostic::{BuildDiagnostic, BuildError, SocketSide};
