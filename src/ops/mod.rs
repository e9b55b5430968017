//! High-level operations backing the CLI commands.

pub mod build;
pub mod targets;
