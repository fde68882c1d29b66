//! CLI command implementations.

pub mod run;
pub mod types;
pub mod validate;
