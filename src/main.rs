//! SkyTemple Packager - release packaging pipeline for the SkyTemple desktop app.
//!
//! This binary prepares the platform build environment (Windows, macOS), installs
//! the native and Python build dependencies, invokes the freeze tool, and
//! post-processes the resulting artifact tree. A separate subcommand renders the
//! Linux container build manifest.

mod cli;
mod error;
mod pipeline;

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
