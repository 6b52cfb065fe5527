//! Subcommand implementations.

pub mod bundle;
pub mod manifest;
