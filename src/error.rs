//! Error types for the relocation engine.
//!
//! Request-level problems are fatal and reported before any traversal starts.
//! Per-file and per-entry problems are recorded in the run summary and never
//! abort a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a run from starting or completing.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// The source root does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source root exists but is not a directory.
    #[error("Source path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    /// The source root was given as an empty string.
    #[error("No source directory given")]
    EmptySource,

    /// No extension was selected.
    #[error("Select at least one extension")]
    NoExtensions,

    /// A path could not be made absolute.
    #[error("Failed to resolve path {}: {source}", path.display())]
    PathResolution { path: PathBuf, source: io::Error },

    /// The background worker could not be started.
    #[error("Failed to start relocation worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// The background worker panicked before returning a summary.
    #[error("Relocation worker stopped unexpectedly")]
    WorkerPanicked,
}

/// Failure while relocating a single matched file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The destination subdirectory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// Copying to the destination failed.
    #[error("failed to copy to {}: {source}", to.display())]
    Copy { to: PathBuf, source: io::Error },

    /// Moving to the destination failed.
    #[error("failed to move to {}: {source}", to.display())]
    Move { to: PathBuf, source: io::Error },

    /// The matched path has no file name component.
    #[error("path has no file name")]
    NoFileName,
}

/// Failure while enumerating the source tree.
#[derive(Debug, Error)]
#[error("cannot read {}: {source}", display_entry(path))]
pub struct TraversalError {
    /// The entry that failed, when walkdir knows it.
    pub path: Option<PathBuf>,
    #[source]
    pub source: walkdir::Error,
}

impl From<walkdir::Error> for TraversalError {
    fn from(source: walkdir::Error) -> Self {
        Self {
            path: source.path().map(|p| p.to_path_buf()),
            source,
        }
    }
}

fn display_entry(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<unknown entry>".to_string(),
    }
}

/// Result type for request-level operations.
pub type RelocateResult<T> = Result<T, RelocateError>;
