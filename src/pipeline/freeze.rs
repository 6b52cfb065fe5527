//! Freeze tool invocation.
//!
//! Runs the external freeze tool against the fixed specification file to
//! produce the packaged application tree. The tool is an opaque collaborator;
//! any non-zero exit invalidates the run.

use crate::pipeline::error::Result;
use crate::pipeline::install::{self, InstallContext};
use std::path::PathBuf;

/// Fixed declarative specification file consumed by the freeze tool.
pub const FREEZE_SPEC: &str = "skytemple.spec";

/// Pipeline-relative location of the produced artifact tree.
pub const ARTIFACT_TREE: &str = "dist/skytemple";

/// Invokes the freeze tool in the work root.
///
/// Precondition: all dependency installs have completed against the active
/// interpreter environment; the spec file references the application's entry
/// point and embedded data by fixed relative paths. Returns the artifact
/// tree location on success.
pub async fn run_freeze(ctx: &InstallContext) -> Result<PathBuf> {
    // Surface a missing interpreter before spawning.
    if which::which(&ctx.python).is_err() {
        crate::bail!("interpreter `{}` not found on PATH", ctx.python);
    }

    log::info!("Freezing application via {}", FREEZE_SPEC);

    let mut command = tokio::process::Command::new(&ctx.python);
    command
        .args(["-m", "PyInstaller", FREEZE_SPEC])
        .current_dir(&ctx.work_root);

    install::run_checked(command, &format!("{} -m PyInstaller {FREEZE_SPEC}", ctx.python)).await?;

    Ok(ctx.work_root.join(ARTIFACT_TREE))
}
