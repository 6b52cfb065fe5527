//! Command line interface for the packager.

mod args;
pub mod commands;

pub use args::{Args, BundleArgs, Command, ManifestArgs};

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    if let Err(reason) = args.validate() {
        return Err(CliError::InvalidArguments { reason }.into());
    }

    match &args.command {
        Command::Bundle(bundle) => commands::bundle::run(bundle).await,
        Command::Manifest(manifest) => commands::manifest::run(manifest).await,
    }
}
