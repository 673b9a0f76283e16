//! Tail error types.

use std::path::PathBuf;

/// Errors that can occur while reading or watching a tailed file.
///
/// These never reach the session registry; the tail layer absorbs them and
/// degrades to "no new data".
#[derive(thiserror::Error, Debug)]
pub enum TailError {
    /// Tailed file was deleted.
    #[error("Tailed file deleted: {0}")]
    FileDeleted(PathBuf),

    /// Permission denied accessing file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// No Tokio runtime to drive the watch task.
    #[error("No async runtime available to watch {0}")]
    RuntimeUnavailable(PathBuf),

    /// Notify watcher error.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TailError {
    /// Map an open failure to the matching variant for `path`.
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileDeleted(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}
