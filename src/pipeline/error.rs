//! Error types for pipeline operations.
//!
//! Each fatal failure mode of the pipeline has a dedicated variant; recoverable
//! conditions (unknown architecture values, missing optional cleanup paths) are
//! handled locally and never reach this enum.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO errors with filesystem context
    #[error("{action} ({path}): {source}")]
    Fs {
        /// What was being attempted
        action: &'static str,
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status on an artifact download
    #[error("download of {url} returned HTTP {status}")]
    HttpStatus {
        /// URL that was fetched
        url: String,
        /// Status code returned
        status: reqwest::StatusCode,
    },

    /// Declared checksum did not match the fetched artifact
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// URL that was fetched
        url: String,
        /// Declared SHA-256 (hex)
        expected: String,
        /// Computed SHA-256 (hex)
        actual: String,
    },

    /// Zero or multiple files matched an expected filename pattern
    #[error("expected exactly one file matching `{pattern}`, found {count}")]
    AmbiguousArtifact {
        /// Glob pattern that was matched
        pattern: String,
        /// Number of matches found
        count: usize,
    },

    /// No locator is declared for the requested platform
    #[error("dependency `{name}` has no locator for platform {platform:?}")]
    UnsupportedPlatform {
        /// Logical dependency name
        name: &'static str,
        /// Platform that was requested
        platform: crate::pipeline::target::Platform,
    },

    /// External command could not be spawned
    #[error("command `{command}` failed to start: {source}")]
    CommandFailed {
        /// Command that failed
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// External command exited with a non-zero status
    #[error("command `{command}` exited with {status}")]
    CommandStatus {
        /// Command that failed
        command: String,
        /// Exit status
        status: std::process::ExitStatus,
    },

    /// Install step declared before one of its prerequisites
    #[error("install step `{step}` is ordered before its prerequisite `{requires}`")]
    PlanOrder {
        /// Offending step
        step: String,
        /// Prerequisite that has not run yet
        requires: String,
    },

    /// Archive extraction errors
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid filename pattern in a dependency spec
    #[error("invalid filename pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Manifest template rendering errors
    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Catch-all for one-off failures
    #[error("{0}")]
    GenericError(String),
}

/// Extension trait attaching filesystem context to IO results.
pub trait ErrorExt<T> {
    /// Wrap an IO error with the attempted action and target path.
    fn fs_context(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Bail out of a pipeline function with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::pipeline::error::Error::GenericError(format!($($arg)*)))
    };
}
