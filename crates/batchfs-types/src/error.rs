//! Error types for batchfs operations
//!
//! One error enum covers the whole engine. Per-item errors during copy and
//! directory creation are fatal to their operation; per-item errors during
//! delete are recorded and skipped. [`Error::classify_io`] maps raw I/O
//! errors onto the domain variants the outcome reporting cares about.

use std::path::PathBuf;

/// Main error type for batchfs operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A source path could not be read during enumeration
    #[error("enumeration failed for '{path}': {message}")]
    Enumeration {
        /// Source path that could not be enumerated
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A directory could not be created
    #[error("failed to create directory '{path}': {message}")]
    DirectoryCreationFailed {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A file could not be copied
    #[error("failed to copy '{path}': {message}")]
    FileCopyFailed {
        /// Source file that could not be copied
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// An entry could not be deleted
    #[error("failed to delete '{path}': {message}")]
    FileDeleteFailed {
        /// Entry that could not be deleted
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Permission denied on an entry
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// Entry the filesystem refused access to
        path: PathBuf,
    },

    /// The destination device is out of space
    #[error("disk full while writing '{path}'")]
    DiskFull {
        /// Entry being written when space ran out
        path: PathBuf,
    },

    /// An entry disappeared between enumeration and execution
    #[error("source vanished: {path}")]
    SourceVanished {
        /// Entry that no longer exists
        path: PathBuf,
    },

    /// A destination path already exists and the conflict policy is `fail`
    #[error("destination already exists: {path}")]
    DestinationExists {
        /// Colliding destination path
        path: PathBuf,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Operation cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Enumeration errors, raised before any mutation
    Enumeration,
    /// Errors mutating the filesystem
    Io,
    /// Name collisions under the `fail` conflict policy
    Conflict,
    /// Configuration errors
    Config,
    /// Cancellation
    Cancelled,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Enumeration { .. } => ErrorKind::Enumeration,
            Self::DirectoryCreationFailed { .. }
            | Self::FileCopyFailed { .. }
            | Self::FileDeleteFailed { .. }
            | Self::PermissionDenied { .. }
            | Self::DiskFull { .. }
            | Self::SourceVanished { .. } => ErrorKind::Io,
            Self::DestinationExists { .. } => ErrorKind::Conflict,
            Self::Config { .. } => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// The path this error is about, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Enumeration { path, .. }
            | Self::DirectoryCreationFailed { path, .. }
            | Self::FileCopyFailed { path, .. }
            | Self::FileDeleteFailed { path, .. }
            | Self::PermissionDenied { path }
            | Self::DiskFull { path }
            | Self::SourceVanished { path }
            | Self::DestinationExists { path } => Some(path),
            Self::Config { .. } | Self::Cancelled | Self::Other { .. } => None,
        }
    }

    /// Classify a raw I/O error against the path it occurred on.
    ///
    /// `fallback` builds the operation-specific variant when the error does
    /// not match one of the cross-cutting categories (permissions, space,
    /// vanished entries).
    pub fn classify_io<F>(path: impl Into<PathBuf>, error: &std::io::Error, fallback: F) -> Self
    where
        F: FnOnce(PathBuf, String) -> Self,
    {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::SourceVanished { path },
            _ if is_disk_full(error) => Self::DiskFull { path },
            _ => fallback(path, error.to_string()),
        }
    }

    /// Create a new enumeration error
    pub fn enumeration<S: Into<String>>(path: impl Into<PathBuf>, message: S) -> Self {
        Self::Enumeration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(unix)]
fn is_disk_full(error: &std::io::Error) -> bool {
    error.raw_os_error() == Some(libc::ENOSPC)
}

#[cfg(not(unix))]
fn is_disk_full(_error: &std::io::Error) -> bool {
    false
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Other {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::classify_io("/locked/file", &io, |path, message| Error::FileCopyFailed {
            path,
            message,
        });

        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.path(), Some(&PathBuf::from("/locked/file")));
    }

    #[test]
    fn test_classify_vanished_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::classify_io("/gone.txt", &io, |path, message| Error::FileCopyFailed {
            path,
            message,
        });

        assert!(matches!(err, Error::SourceVanished { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_disk_full() {
        let io = std::io::Error::from_raw_os_error(libc::ENOSPC);
        let err = Error::classify_io("/dest/big.bin", &io, |path, message| {
            Error::FileCopyFailed { path, message }
        });

        assert!(matches!(err, Error::DiskFull { .. }));
        assert!(err.to_string().contains("/dest/big.bin"));
    }

    #[test]
    fn test_classify_fallback() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "short write");
        let err = Error::classify_io("/dest/a", &io, |path, message| Error::FileCopyFailed {
            path,
            message,
        });

        assert!(matches!(err, Error::FileCopyFailed { .. }));
        assert!(err.to_string().contains("short write"));
    }

    #[test]
    fn test_conflict_kind() {
        let err = Error::DestinationExists {
            path: PathBuf::from("/dest/taken.txt"),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_cancelled_has_no_path() {
        assert_eq!(Error::Cancelled.path(), None);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }
}
