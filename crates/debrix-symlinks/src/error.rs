//! # Design
//!
//! - Provide structured, constant-message errors for symlink resolution.
//! - Capture operation context (paths, attempts) to make failures
//!   reproducible in tests.
//! - Preserve source errors without interpolating context into messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for symlink resolution operations.
pub type SymlinkResult<T> = Result<T, SymlinkError>;

/// Errors produced by the symlink resolution worker.
#[derive(Debug, Error)]
pub enum SymlinkError {
    /// The expected file is an archive this strategy cannot handle.
    #[error("unsupported archive extension")]
    UnsupportedExtension {
        /// Extension that triggered the rejection.
        extension: String,
    },
    /// A request field was unusable.
    #[error("invalid download request")]
    InvalidRequest {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// The configured mount root does not exist on disk.
    #[error("mount root missing")]
    MissingMountRoot {
        /// Root path that failed the existence check.
        path: PathBuf,
    },
    /// The expected file never appeared within the retry budget.
    #[error("file not found under mount root")]
    NotFound {
        /// Filename that was searched for.
        file: String,
        /// Number of attempts that were made.
        attempts: u32,
    },
    /// Creating or verifying the symlink failed.
    #[error("symlink creation failed")]
    LinkFailed {
        /// Destination path of the attempted link.
        path: PathBuf,
        /// Detail describing the creation or verification failure.
        detail: String,
    },
    /// The caller requested cancellation between attempts.
    #[error("symlink resolution cancelled")]
    Cancelled,
    /// IO failures while interacting with the filesystem.
    #[error("symlink io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}
