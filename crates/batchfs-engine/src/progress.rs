//! Progress publishing for running operations
//!
//! The tracker is the single writer of an operation's progress state; any
//! number of observers read [`ProgressSnapshot`]s through the paired watch
//! receiver without ever blocking the worker.

use batchfs_types::{OperationState, ProgressSnapshot};
use std::path::Path;
use tokio::sync::watch;

/// Single-writer progress publisher for one operation
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    snapshot: ProgressSnapshot,
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    /// Create a tracker and the receiver observers read from
    pub fn new() -> (Self, watch::Receiver<ProgressSnapshot>) {
        let snapshot = ProgressSnapshot::pending();
        let (tx, rx) = watch::channel(snapshot.clone());
        (Self { snapshot, tx }, rx)
    }

    /// Fix the total unit count. Called once, when enumeration completes;
    /// the total is never recomputed mid-run.
    pub fn set_total(&mut self, total_units: u64) {
        self.snapshot.total_units = total_units;
        self.publish();
    }

    /// Move the operation to a new state
    pub fn set_state(&mut self, state: OperationState) {
        self.snapshot.state = state;
        self.publish();
    }

    /// Record completed units and the entry just worked on.
    ///
    /// Monotonic, and clamped so completed units never exceed the total.
    pub fn advance(&mut self, units: u64, current: &Path) {
        self.snapshot.completed_units = self
            .snapshot
            .completed_units
            .saturating_add(units)
            .min(self.snapshot.total_units);
        self.snapshot.current_path = Some(current.to_path_buf());
        self.publish();
    }

    /// Units completed so far
    pub fn completed_units(&self) -> u64 {
        self.snapshot.completed_units
    }

    /// Fixed total units
    pub fn total_units(&self) -> u64 {
        self.snapshot.total_units
    }

    fn publish(&self) {
        // send_replace never fails, even with no receiver left.
        self.tx.send_replace(self.snapshot.clone());
    }
}
