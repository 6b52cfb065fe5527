//! Release packaging pipeline library for SkyTemple.
//!
//! This library provides the orchestration logic for producing the shippable
//! desktop artifact:
//! - Windows: frozen application tree with themes and native extension wheel
//! - macOS: frozen application tree with the arch-matched native extension wheel
//! - Linux: rendered container build manifest for the external container builder
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
pub use pipeline::target::{Arch, BuildTarget, Mode, Platform};
