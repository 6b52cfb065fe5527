//! Artifact fetching and installation.
//!
//! Consumes [`ResolvedDependency`] values produced by the resolver: fetches
//! the artifact, verifies a declared checksum, and installs it using the
//! method declared on the originating spec. All archive work happens inside a
//! scoped temporary area that is removed on both success and failure.

pub mod plan;

use crate::pipeline::error::{Error, ErrorExt, Result};
use crate::pipeline::resolver::{InstallMethod, ResolvedDependency, Verification};
use crate::pipeline::utils::{archive, fs as pfs, http};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Shared context for install operations.
///
/// Holds the two resources the sequential pipeline mutates in place: the
/// working directory and the active interpreter environment.
#[derive(Clone, Debug)]
pub struct InstallContext {
    /// Root of the build working directory
    pub work_root: PathBuf,
    /// Interpreter command used for environment installs and version queries
    pub python: String,
}

impl InstallContext {
    /// Creates a context rooted at `work_root`, driving `python`.
    pub fn new(work_root: impl Into<PathBuf>, python: impl Into<String>) -> Self {
        Self {
            work_root: work_root.into(),
            python: python.into(),
        }
    }
}

/// Fetches and installs one resolved dependency.
///
/// A failed fetch or install aborts the pipeline; there is no retry and no
/// rollback. Partial environment-install failures leave the interpreter
/// environment inconsistent, and the run must be discarded.
pub async fn install(resolved: &ResolvedDependency, ctx: &InstallContext) -> Result<()> {
    log::info!("Installing {} from {}", resolved.name, resolved.url);

    let bytes = http::download(&resolved.url).await?;
    verify(resolved, &bytes)?;

    match resolved.install {
        InstallMethod::ExtractArchive { dest } => {
            let dest = ctx.work_root.join(dest);
            tokio::fs::create_dir_all(&dest)
                .await
                .fs_context("creating extraction destination", &dest)?;
            archive::extract(&resolved.url, bytes, &dest).await?;
        }
        InstallMethod::EnvironmentInstall => {
            install_into_environment(resolved, bytes, ctx).await?;
        }
        InstallMethod::FileCopy { dest } => {
            let dest = ctx.work_root.join(dest);
            pfs::write_file(&dest, &bytes).await?;
        }
    }

    log::debug!("Installed {}", resolved.name);
    Ok(())
}

/// Installs the application's own dependency manifest into the interpreter
/// environment. Must run after every native-extension install.
pub async fn install_requirements(manifest: &str, ctx: &InstallContext) -> Result<()> {
    log::info!("Installing dependency manifest {}", manifest);
    run_pip(ctx, &["install", "-r", manifest]).await
}

/// Installs the in-tree application package. Ordered last in every plan so it
/// resolves against the already-installed native bindings.
pub async fn install_application(ctx: &InstallContext) -> Result<()> {
    log::info!("Installing in-tree application package");
    run_pip(ctx, &["install", "."]).await
}

fn verify(resolved: &ResolvedDependency, bytes: &[u8]) -> Result<()> {
    match resolved.verify {
        Verification::None => Ok(()),
        Verification::Sha256(expected) => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(Error::ChecksumMismatch {
                    url: resolved.url.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
            Ok(())
        }
    }
}

/// Unpacks a wheel bundle into a scoped temp area, matches the declared
/// filename pattern against its contents, and pip-installs the single match.
async fn install_into_environment(
    resolved: &ResolvedDependency,
    bytes: Vec<u8>,
    ctx: &InstallContext,
) -> Result<()> {
    // TempDir removes the extraction area on drop, on every exit path.
    let scratch = tempfile::tempdir().map_err(|e| Error::Fs {
        action: "creating temporary extraction area",
        path: std::env::temp_dir(),
        source: e,
    })?;

    archive::extract(&resolved.url, bytes, scratch.path()).await?;
    let wheel = archive::find_single_match(scratch.path(), resolved.file_pattern).await?;

    let wheel = wheel
        .to_str()
        .ok_or_else(|| Error::GenericError(format!("wheel path is not valid UTF-8: {wheel:?}")))?;
    run_pip(ctx, &["install", wheel]).await
}

async fn run_pip(ctx: &InstallContext, args: &[&str]) -> Result<()> {
    let mut command = tokio::process::Command::new(&ctx.python);
    command.arg("-m").arg("pip").args(args);
    command.current_dir(&ctx.work_root);
    run_checked(command, &format!("{} -m pip {}", ctx.python, args.join(" "))).await
}

/// Runs an external command, mapping spawn failures and non-zero exits to
/// pipeline errors.
pub(crate) async fn run_checked(
    mut command: tokio::process::Command,
    display: &str,
) -> Result<()> {
    let status = command
        .status()
        .await
        .map_err(|source| Error::CommandFailed {
            command: display.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(Error::CommandStatus {
            command: display.to_string(),
            status,
        });
    }
    Ok(())
}
