//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release packaging pipeline for the SkyTemple desktop application
#[derive(Parser, Debug)]
#[command(
    name = "skytemple-packager",
    version,
    about = "Release packaging pipeline for SkyTemple",
    long_about = "Prepares the platform build environment, installs native and Python build \
dependencies, invokes the freeze tool and post-processes the artifact tree.

Build mode and platform come from environment signals: IS_DEV_BUILD selects the \
development (trunk) dependency branch, IS_MACOS selects the macOS pipeline, and \
the machine architecture picks the Apple Silicon wheel variant.

Usage:
  skytemple-packager bundle 1.6.3
  IS_MACOS=1 skytemple-packager bundle
  skytemple-packager manifest --skytemple-rev 1.6.3 --output org.skytemple.SkyTemple.json"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the frozen-tree packaging pipeline (Windows/macOS)
    Bundle(BundleArgs),
    /// Render the container build manifest (Linux packaging path)
    Manifest(ManifestArgs),
}

/// Arguments for the `bundle` subcommand
#[derive(clap::Args, Debug)]
pub struct BundleArgs {
    /// Version stamp written into the artifact; derived from the installed
    /// application package when omitted
    pub version: Option<String>,

    /// Build working directory containing the application checkout
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub work_dir: PathBuf,

    /// Interpreter command driving environment installs and the freeze tool
    #[arg(long, default_value = "python", value_name = "CMD")]
    pub python: String,

    /// Output-channel file for emitted variables (version stamp)
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub output_channel: Option<PathBuf>,
}

/// Arguments for the `manifest` subcommand
#[derive(clap::Args, Debug)]
pub struct ManifestArgs {
    /// Where to write the rendered manifest
    #[arg(long, default_value = "org.skytemple.SkyTemple.json", value_name = "PATH")]
    pub output: PathBuf,

    /// Revision of the application repository
    #[arg(long, value_name = "REV")]
    pub skytemple_rev: String,

    /// Revision of the native extension repository
    #[arg(long, value_name = "REV")]
    pub skytemple_rust_rev: String,

    /// Revision of the armips toolchain repository
    #[arg(long, default_value = "v0.11.0", value_name = "REV")]
    pub armips_rev: String,

    /// SHA-256 of the bundled requirements manifest
    #[arg(long, value_name = "HEX")]
    pub requirements_sha256: String,

    /// JSON file with the expanded Python dependency source entries
    #[arg(long, value_name = "PATH")]
    pub requirements_sources: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Bundle(bundle) => {
                if let Some(version) = &bundle.version {
                    if version.trim().is_empty() {
                        return Err("Version stamp cannot be empty".to_string());
                    }
                }
            }
            Command::Manifest(manifest) => {
                if manifest.requirements_sha256.len() != 64
                    || !manifest
                        .requirements_sha256
                        .chars()
                        .all(|c| c.is_ascii_hexdigit())
                {
                    return Err(format!(
                        "--requirements-sha256 must be a 64-character hex digest, got `{}`",
                        manifest.requirements_sha256
                    ));
                }
            }
        }
        Ok(())
    }
}
