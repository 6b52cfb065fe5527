//! Artifact tree post-processing.
//!
//! Platform-conditional cleanup and normalization applied to the freeze
//! tool's output: certificate relocation, bulk pruning of non-essential
//! files, and version stamping. Every operation here is idempotent. Missing
//! optional paths are skipped through explicit existence checks; all other
//! failures are fatal, since they indicate a corrupted environment.

use crate::pipeline::error::{Error, ErrorExt, Result};
use crate::pipeline::install::InstallContext;
use crate::pipeline::utils::fs as pfs;
use std::path::Path;

/// Nested tool-default location the certificate bundle lands at.
const CERT_SOURCE: &str = "certifi/cacert.pem";

/// Canonical top-level path the running application expects at runtime.
const CERT_DEST: &str = "cacert.pem";

/// Documentation directories pruned wholesale from the artifact tree.
const PRUNE_DIRS: &[&str] = &["share/doc", "share/man", "share/gtk-doc"];

/// Copies the root-certificate bundle to the canonical top-level path.
///
/// Copy, not move: the nested path may still be referenced elsewhere in the
/// packaged form. Absent bundle is a no-op.
pub async fn relocate_certificates(tree: &Path) -> Result<()> {
    let source = tree.join(CERT_SOURCE);
    if !source.exists() {
        log::debug!("no certificate bundle at {}, skipping", source.display());
        return Ok(());
    }
    pfs::copy_file(&source, &tree.join(CERT_DEST)).await
}

/// Removes documentation and man-page directories from the artifact tree.
///
/// Running this twice on the same tree is a no-op the second time.
pub async fn prune_artifacts(tree: &Path) -> Result<()> {
    for dir in PRUNE_DIRS {
        let path = tree.join(dir);
        log::debug!("pruning {}", path.display());
        pfs::remove_dir_all(&path).await?;
    }
    Ok(())
}

/// Resolves the version stamp for this run.
///
/// An explicitly supplied version wins; otherwise the installed application
/// package reports its own version through the interpreter. The query is only
/// valid after the install phase has completed.
pub async fn resolve_version(
    explicit: Option<String>,
    ctx: &InstallContext,
) -> Result<String> {
    if let Some(version) = explicit {
        return Ok(version);
    }

    let output = tokio::process::Command::new(&ctx.python)
        .args([
            "-c",
            "from importlib.metadata import version; print(version('skytemple'))",
        ])
        .current_dir(&ctx.work_root)
        .output()
        .await
        .map_err(|source| Error::CommandFailed {
            command: format!("{} -c <version query>", ctx.python),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::CommandStatus {
            command: format!("{} -c <version query>", ctx.python),
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Writes the version stamp into the artifact tree and the output channel.
///
/// The stamp lands verbatim at `VERSION` in the tree root and at the nested
/// duplicate alongside the embedded application data. When `output_channel`
/// names a file, `version=<stamp>` is appended for the external CI system.
pub async fn stamp_version(
    tree: &Path,
    version: &str,
    output_channel: Option<&Path>,
) -> Result<()> {
    log::info!("Stamping version {}", version);

    pfs::write_file(&tree.join("VERSION"), version.as_bytes()).await?;
    pfs::write_file(&tree.join("data/VERSION"), version.as_bytes()).await?;

    if let Some(channel) = output_channel {
        append_output(channel, "version", version).await?;
    }
    Ok(())
}

/// Appends a `key=value` line to the CI output-channel file.
async fn append_output(channel: &Path, key: &str, value: &str) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(channel)
        .await
        .fs_context("opening output channel", channel)?;
    file.write_all(format!("{key}={value}\n").as_bytes())
        .await
        .fs_context("writing output channel", channel)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn certificate_is_copied_not_moved() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join(CERT_SOURCE);
        tokio::fs::create_dir_all(nested.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&nested, b"PEM DATA").await.unwrap();

        relocate_certificates(dir.path()).await.unwrap();

        let top = dir.path().join(CERT_DEST);
        assert_eq!(tokio::fs::read(&top).await.unwrap(), b"PEM DATA");
        // Original remains untouched
        assert_eq!(tokio::fs::read(&nested).await.unwrap(), b"PEM DATA");
    }

    #[tokio::test]
    async fn missing_certificate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        relocate_certificates(dir.path()).await.unwrap();
        assert!(!dir.path().join(CERT_DEST).exists());
    }

    #[tokio::test]
    async fn pruning_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("share/doc/pkg");
        tokio::fs::create_dir_all(&doc).await.unwrap();
        tokio::fs::write(doc.join("README"), b"docs").await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("share/themes"))
            .await
            .unwrap();

        prune_artifacts(dir.path()).await.unwrap();
        assert!(!dir.path().join("share/doc").exists());
        // Unrelated directories survive
        assert!(dir.path().join("share/themes").exists());

        // Second run is a no-op, never an error
        prune_artifacts(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn stamp_writes_version_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let channel = dir.path().join("outputs.txt");

        stamp_version(dir.path(), "1.6.2", Some(&channel))
            .await
            .unwrap();

        let root = tokio::fs::read_to_string(dir.path().join("VERSION"))
            .await
            .unwrap();
        assert_eq!(root, "1.6.2");
        let nested = tokio::fs::read_to_string(dir.path().join("data/VERSION"))
            .await
            .unwrap();
        assert_eq!(nested, "1.6.2");
        let emitted = tokio::fs::read_to_string(&channel).await.unwrap();
        assert_eq!(emitted, "version=1.6.2\n");
    }

    #[tokio::test]
    async fn stamp_appends_to_existing_channel() {
        let dir = tempfile::tempdir().unwrap();
        let channel = dir.path().join("outputs.txt");
        tokio::fs::write(&channel, "earlier=1\n").await.unwrap();

        stamp_version(dir.path(), "2.0.0", Some(&channel))
            .await
            .unwrap();

        let emitted = tokio::fs::read_to_string(&channel).await.unwrap();
        assert_eq!(emitted, "earlier=1\nversion=2.0.0\n");
    }

    #[tokio::test]
    async fn explicit_version_wins_without_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = InstallContext::new(dir.path(), "definitely-not-a-real-python");
        let v = resolve_version(Some("3.1.4".into()), &ctx).await.unwrap();
        assert_eq!(v, "3.1.4");
    }
}
