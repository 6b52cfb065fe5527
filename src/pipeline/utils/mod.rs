//! Shared helpers for pipeline operations.

pub mod archive;
pub mod fs;
pub mod http;
