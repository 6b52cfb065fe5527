//! Archive extraction helpers.
//!
//! Wheel bundles arrive as zip archives, theme artifacts as gzipped tarballs.
//! Extraction is blocking work and runs on the dedicated thread pool.

use crate::pipeline::error::{Error, Result};
use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

/// Extracts an archive into the given directory, deciding the format from the
/// URL or filename the bytes were fetched from.
pub async fn extract(source_name: &str, bytes: Vec<u8>, dest: &Path) -> Result<()> {
    if source_name.ends_with(".zip") || source_name.ends_with(".whl") {
        extract_zip(bytes, dest).await
    } else if source_name.ends_with(".tar.gz") || source_name.ends_with(".tgz") {
        extract_tar_gz(bytes, dest).await
    } else {
        crate::bail!("unsupported archive format: {source_name}");
    }
}

/// Extracts a zip archive into the given directory.
pub async fn extract_zip(bytes: Vec<u8>, dest: &Path) -> Result<()> {
    let dest = dest.to_path_buf();
    spawn_extract(move || {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        archive.extract(&dest)?;
        Ok(())
    })
    .await
}

/// Extracts a gzipped tarball into the given directory.
pub async fn extract_tar_gz(bytes: Vec<u8>, dest: &Path) -> Result<()> {
    let dest = dest.to_path_buf();
    spawn_extract(move || {
        let gz = flate2::read::GzDecoder::new(Cursor::new(bytes));
        let mut archive = tar::Archive::new(gz);
        archive.unpack(&dest)?;
        Ok(())
    })
    .await
}

async fn spawn_extract<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::GenericError(format!("extraction task panicked: {e}")))?
}

/// Finds the single file under `dir` whose name matches `pattern`.
///
/// Walks the whole extraction tree, since some artifact bundles nest their
/// contents in a subdirectory. Zero matches and multiple matches are both
/// install-time failures; the pipeline never proceeds with a guessed artifact.
pub async fn find_single_match(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let matcher = glob::Pattern::new(pattern)?;

    let mut matches = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| Error::GenericError(format!("walking {dir:?}: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            matches.push(entry.path().to_path_buf());
        }
    }

    if matches.len() != 1 {
        return Err(Error::AmbiguousArtifact {
            pattern: pattern.to_string(),
            count: matches.len(),
        });
    }

    Ok(matches.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn touch(dir: &Path, name: &str) {
        tokio::fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[tokio::test]
    async fn single_match_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "skytemple_rust-1.6.2-cp312-win_amd64.whl").await;
        touch(dir.path(), "README.md").await;

        let found = find_single_match(dir.path(), "skytemple_rust-*-cp3*-win_amd64.whl")
            .await
            .unwrap();
        assert!(
            found
                .file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("win_amd64.whl")
        );
    }

    #[tokio::test]
    async fn nested_single_match_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("wheels");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        touch(&nested, "skytemple_rust-1.6.2-cp312-macosx_11_0_arm64.whl").await;

        let found = find_single_match(dir.path(), "skytemple_rust-*-cp3*-macosx_*_arm64.whl")
            .await
            .unwrap();
        assert!(found.starts_with(&nested));
    }

    #[tokio::test]
    async fn zero_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "unrelated.txt").await;

        let err = find_single_match(dir.path(), "*.whl").await.unwrap_err();
        assert!(matches!(err, Error::AmbiguousArtifact { count: 0, .. }));
    }

    #[tokio::test]
    async fn multiple_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a-1.0-win_amd64.whl").await;
        touch(dir.path(), "a-2.0-win_amd64.whl").await;

        let err = find_single_match(dir.path(), "*.whl").await.unwrap_err();
        assert!(matches!(err, Error::AmbiguousArtifact { count: 2, .. }));
    }

    #[tokio::test]
    async fn extract_rejects_unknown_formats() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract("artifact.rar", vec![0u8; 4], dir.path()).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn extract_zip_roundtrip() {
        use std::io::Write;

        // Build a small in-memory zip
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("inner.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"payload").unwrap();
            writer.finish().unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        extract_zip(cursor.into_inner(), dir.path()).await.unwrap();
        let content = tokio::fs::read(dir.path().join("inner.txt")).await.unwrap();
        assert_eq!(content, b"payload");
    }
}
