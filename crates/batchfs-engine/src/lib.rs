//! Background execution engine for long-running file operations
//!
//! This crate orchestrates recursive copy, move, delete and
//! directory-creation jobs away from the caller's interactive path. An
//! operation is submitted to the [`Engine`] and runs on a background task;
//! the returned [`OperationHandle`] exposes incremental progress snapshots,
//! cooperative cancellation and the terminal
//! [`Outcome`](batchfs_types::Outcome).
//!
//! Copies are transactional at the operation level: every mutation is
//! recorded in an action log, and a failed or cancelled copy replays the
//! log in reverse to restore the destination. Deletes are the opposite,
//! best-effort per entry, so one undeletable file never blocks the rest of
//! the tree.
//!
//! # Example
//!
//! ```no_run
//! use batchfs_engine::{Engine, Request};
//!
//! # async fn run() {
//! let engine = Engine::new();
//! let handle = engine.submit(Request::copy(
//!     vec!["/sdcard/DCIM".into()],
//!     "/sdcard/Backup",
//! ));
//! let outcome = handle.wait().await;
//! println!("{}", outcome.summary());
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

mod cancel;
mod engine;
mod executor;
mod progress;
mod rollback;
mod task;

pub use cancel::CancelToken;
pub use engine::{Engine, OperationHandle};
pub use task::{Op, OperationId, OperationKind, Request};

pub use batchfs_types::{
    ConflictPolicy, Error, OpStats, OperationState, Outcome, OutcomeStatus, ProgressSnapshot,
    ProgressWeighting, Result, RollbackWarning,
};
