//! Core data types for batchfs
//!
//! Data model shared by the enumerator, executor, rollback controller, and
//! orchestrator: filesystem entry snapshots, traversal work items, the
//! append-only action log, progress snapshots, and terminal outcomes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::Error;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link, treated as a leaf and never traversed into
    Symlink,
}

/// Immutable snapshot of a filesystem entry taken at enumeration time.
///
/// The entry vanishing before execution is a runtime error
/// ([`Error::SourceVanished`]), not an invariant violation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Entry kind
    pub kind: EntryKind,
    /// Size in bytes (files only, zero otherwise)
    pub size: u64,
    /// Last modification time, when the filesystem reports one
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Create a new entry snapshot
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, size: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            size,
            modified: None,
        }
    }

    /// Attach a modification timestamp
    pub fn with_modified(mut self, modified: Option<SystemTime>) -> Self {
        self.modified = modified;
        self
    }
}

/// One enumerated entry scheduled for an action
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkItem {
    /// Entry snapshot
    pub entry: Entry,
    /// Path of the entry relative to the enumeration root, used to anchor
    /// it under a destination directory
    pub relative_path: PathBuf,
    /// Traversal depth, zero for the enumerated roots themselves
    pub depth: usize,
}

impl WorkItem {
    /// Progress weight of this item under the given weighting
    pub fn weight(&self, weighting: ProgressWeighting) -> u64 {
        match weighting {
            ProgressWeighting::Items => 1,
            // Directories and symlinks still weigh one unit so a plan of
            // empty entries keeps a nonzero total.
            ProgressWeighting::Bytes => match self.entry.kind {
                EntryKind::File => self.entry.size.max(1),
                EntryKind::Directory | EntryKind::Symlink => 1,
            },
        }
    }
}

/// Record of one successfully completed mutating action
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionLogEntry {
    /// A directory was created at the destination
    CreatedDirectory(PathBuf),
    /// A file was copied to the destination
    CopiedFile(PathBuf),
    /// An entry was deleted in place
    DeletedEntry(PathBuf),
}

impl ActionLogEntry {
    /// Path the action touched
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::CreatedDirectory(path) | Self::CopiedFile(path) | Self::DeletedEntry(path) => {
                path
            }
        }
    }
}

/// Append-only log of executor side effects, the sole input to rollback.
///
/// Owned by one executor run; it is handed to the rollback controller only
/// after the executor has stopped writing.
#[derive(Debug, Default)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed action
    pub fn record(&mut self, entry: ActionLogEntry) {
        self.entries.push(entry);
    }

    /// Number of recorded actions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no action was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the actions in the order they occurred
    pub fn iter(&self) -> std::slice::Iter<'_, ActionLogEntry> {
        self.entries.iter()
    }

    /// Consume the log, yielding the actions in the order they occurred
    pub fn into_entries(self) -> Vec<ActionLogEntry> {
        self.entries
    }
}

/// Policy applied when a destination path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConflictPolicy {
    /// Replace the existing destination entry
    Overwrite,
    /// Leave the existing entry and skip the colliding item
    Skip,
    /// Abort the whole operation on first collision
    #[default]
    Fail,
}

/// What drives progress accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProgressWeighting {
    /// One unit per work item
    #[default]
    Items,
    /// File byte sizes, for smoother progress on uneven trees
    Bytes,
}

/// State of one orchestrated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperationState {
    /// Building the work list, read-only
    Enumerating,
    /// Mutating the filesystem
    Executing,
    /// Undoing a failed or cancelled copy
    RollingBack,
    /// Terminal: everything completed
    Succeeded,
    /// Terminal: ended with an error. Snapshots collapse partial and total
    /// failure into this one state; only [`OutcomeStatus`] distinguishes
    /// them.
    Failed,
    /// Terminal: stopped on cancellation
    Cancelled,
}

impl OperationState {
    /// Check if the operation has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Point-in-time view of an operation's progress
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressSnapshot {
    /// Current operation state
    pub state: OperationState,
    /// Weighted units completed so far
    pub completed_units: u64,
    /// Total weighted units, fixed once enumeration completes
    pub total_units: u64,
    /// Entry most recently worked on
    pub current_path: Option<PathBuf>,
}

impl ProgressSnapshot {
    /// Snapshot for an operation that has not enumerated yet
    pub fn pending() -> Self {
        Self {
            state: OperationState::Enumerating,
            completed_units: 0,
            total_units: 0,
            current_path: None,
        }
    }

    /// Overall progress percentage
    pub fn percent(&self) -> f64 {
        if self.total_units > 0 {
            (self.completed_units as f64 / self.total_units as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Counters for one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpStats {
    /// Number of files copied
    pub files_copied: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of items skipped under the `skip` conflict policy
    pub entries_skipped: u64,
    /// Number of entries deleted
    pub entries_deleted: u64,
}

impl OpStats {
    /// Create empty counters
    pub fn new() -> Self {
        Self::default()
    }
}

/// Warning recorded while rollback could not fully restore the destination
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RollbackWarning {
    /// Path that could not be rolled back
    pub path: PathBuf,
    /// What went wrong
    pub message: String,
}

impl std::fmt::Display for RollbackWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rollback incomplete for '{}': {}", self.path.display(), self.message)
    }
}

/// Terminal classification of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutcomeStatus {
    /// Every work item completed without error or cancellation
    Success,
    /// Some entries were not processed (per-item deletions failed, or a
    /// move retained originals it never copied) while the rest of the tree
    /// completed. The terminal progress state for this status is
    /// [`OperationState::Failed`].
    PartialFailure,
    /// Aborted on a fatal error; for copy, rollback has run
    Failed,
    /// Stopped on cancellation
    Cancelled,
}

/// Terminal result of one orchestrated operation
#[derive(Debug)]
pub struct Outcome {
    /// Terminal classification
    pub status: OutcomeStatus,
    /// Paths whose individual action failed, plus sources a move retained
    /// because their copy was skipped
    pub failed_paths: BTreeSet<PathBuf>,
    /// Counters for the work that did complete
    pub stats: OpStats,
    /// Warnings from a rollback sweep that could not undo everything
    pub rollback_warnings: Vec<RollbackWarning>,
    /// The error that aborted the operation, if any
    pub error: Option<Error>,
    /// Weighted units completed when the operation ended
    pub completed_units: u64,
    /// Total weighted units
    pub total_units: u64,
}

impl Outcome {
    /// Check if the operation fully succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success)
    }

    /// Check if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, OutcomeStatus::Cancelled)
    }

    /// Human-readable completion summary with counts rather than a bare
    /// boolean, e.g. `"3 of 4 units succeeded"`
    pub fn summary(&self) -> String {
        format!(
            "{} of {} units succeeded",
            self.completed_units, self.total_units
        )
    }
}
