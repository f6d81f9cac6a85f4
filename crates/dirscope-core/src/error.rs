/// Error types for the scanner.
///
/// Only root-level failures are fatal and surface as [`ScanError`]. Problems
/// with individual children never fail a scan; they are recorded as
/// [`SkippedEntry`] values and the walk carries on.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A fatal scan failure.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root path does not exist.
    #[error("directory does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// The root path exists but cannot be read.
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// The root path exists but is not a directory.
    #[error("path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// Any other I/O failure on the root.
    #[error("failed to read directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The scan was stopped through its cancel flag.
    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// Map an I/O error on the scan root to the matching variant.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source: err },
        }
    }
}

/// Why a child was left out of a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SkipReason {
    PermissionDenied,
    /// Vanished between listing and stat, or a dangling symlink in follow mode.
    NotFound,
    /// A followed symlink pointing back at a directory on the current path.
    SymlinkCycle,
    /// The name is not valid UTF-8 and cannot be reported without loss.
    InvalidName,
    Io,
}

impl SkipReason {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Io,
        }
    }
}

/// A non-fatal, per-entry failure recorded during a walk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
    pub message: String,
}

impl SkippedEntry {
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: SkipReason::from_io(err),
            message: err.to_string(),
        }
    }

    pub fn symlink_cycle(path: &Path, target: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: SkipReason::SymlinkCycle,
            message: format!("links back to ancestor {}", target.display()),
        }
    }

    pub fn invalid_name(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: SkipReason::InvalidName,
            message: "name is not valid UTF-8".to_string(),
        }
    }
}
