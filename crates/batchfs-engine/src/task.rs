//! Operation requests and identifiers

use batchfs_types::ConflictPolicy;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Create a new operation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four supported operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Recursive copy of sources into a destination directory
    Copy,
    /// Cut-paste: copy, then delete the originals once the copy succeeded
    Move,
    /// Recursive in-place delete
    Delete,
    /// Creation of a single directory
    CreateDir,
}

/// What an operation should do
#[derive(Debug, Clone)]
pub enum Op {
    /// Copy `sources` under `destination`
    Copy {
        /// Source entries to copy
        sources: Vec<PathBuf>,
        /// Existing directory the sources are copied into
        destination: PathBuf,
    },
    /// Move `sources` under `destination`
    Move {
        /// Source entries to move
        sources: Vec<PathBuf>,
        /// Existing directory the sources are moved into
        destination: PathBuf,
    },
    /// Delete `paths`, recursively
    Delete {
        /// Entries to delete
        paths: Vec<PathBuf>,
    },
    /// Create the directory at `path`
    CreateDir {
        /// Directory to create
        path: PathBuf,
    },
}

/// A request for one background operation
#[derive(Debug, Clone)]
pub struct Request {
    /// What to do
    pub op: Op,
    /// Conflict policy override; the engine configuration applies when unset
    pub conflict_policy: Option<ConflictPolicy>,
}

impl Request {
    /// Copy `sources` into the existing directory `destination`
    pub fn copy(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            op: Op::Copy {
                sources,
                destination: destination.into(),
            },
            conflict_policy: None,
        }
    }

    /// Move `sources` into the existing directory `destination`
    pub fn move_to(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            op: Op::Move {
                sources,
                destination: destination.into(),
            },
            conflict_policy: None,
        }
    }

    /// Delete `paths` recursively, in place
    pub fn delete(paths: Vec<PathBuf>) -> Self {
        Self {
            op: Op::Delete { paths },
            conflict_policy: None,
        }
    }

    /// Create a single directory at `path`
    pub fn create_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            op: Op::CreateDir { path: path.into() },
            conflict_policy: None,
        }
    }

    /// Override the configured conflict policy for this request
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }

    /// The kind of this request
    pub fn kind(&self) -> OperationKind {
        match self.op {
            Op::Copy { .. } => OperationKind::Copy,
            Op::Move { .. } => OperationKind::Move,
            Op::Delete { .. } => OperationKind::Delete,
            Op::CreateDir { .. } => OperationKind::CreateDir,
        }
    }
}
