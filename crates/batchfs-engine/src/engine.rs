//! Operation orchestration and the public engine facade
//!
//! The engine accepts [`Request`]s, runs one operation at a time on a
//! background task, and hands callers an [`OperationHandle`] for progress
//! observation, cancellation and completion. A single-permit semaphore
//! serializes operations so two batch jobs never interleave filesystem
//! mutations.

use crate::cancel::CancelToken;
use crate::executor::{self, CopyPhase, DeletePhase, Executor, ExecutorOptions};
use crate::progress::ProgressTracker;
use crate::rollback::roll_back;
use crate::task::{Op, OperationId, Request};
use batchfs_config::Config;
use batchfs_types::{
    Error, OpStats, OperationState, Outcome, OutcomeStatus, ProgressSnapshot, RollbackWarning,
};
use batchfs_walk::{plan_copy, plan_delete, Plan};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Background file operation engine.
///
/// Cheap to clone; clones share the same serialization gate and
/// configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<Config>,
    gate: Arc<Semaphore>,
}

impl Engine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            gate: Arc::new(Semaphore::new(1)),
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit an operation for background execution.
    ///
    /// Returns immediately; the operation starts once any operation ahead
    /// of it has finished. The handle is the only way to observe or cancel
    /// the operation.
    pub fn submit(&self, request: Request) -> OperationHandle {
        let id = OperationId::new();
        let cancel = CancelToken::new();
        let (tracker, progress) = ProgressTracker::new();

        let options = ExecutorOptions {
            conflict: request
                .conflict_policy
                .unwrap_or(self.config.operation.conflict_policy),
            weighting: self.config.operation.progress_weighting,
            preserve_mtime: self.config.operation.preserve_mtime,
        };

        info!(%id, kind = ?request.kind(), "operation submitted");

        let gate = Arc::clone(&self.gate);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // The gate is never closed while an engine clone lives.
                    return failed_outcome(
                        Error::other("engine gate closed"),
                        BTreeSet::new(),
                        OpStats::new(),
                        Vec::new(),
                        0,
                        0,
                    );
                }
            };
            let outcome = run_operation(request.op, options, task_cancel, tracker).await;
            match outcome.status {
                OutcomeStatus::Success => info!(%id, summary = %outcome.summary(), "operation succeeded"),
                OutcomeStatus::PartialFailure => {
                    warn!(%id, failed = outcome.failed_paths.len(), "operation partially failed")
                }
                OutcomeStatus::Failed => {
                    error!(%id, error = ?outcome.error, "operation failed")
                }
                OutcomeStatus::Cancelled => info!(%id, "operation cancelled"),
            }
            outcome
        });

        OperationHandle {
            id,
            cancel,
            progress,
            task,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-side handle to one submitted operation
#[derive(Debug)]
pub struct OperationHandle {
    id: OperationId,
    cancel: CancelToken,
    progress: watch::Receiver<ProgressSnapshot>,
    task: JoinHandle<Outcome>,
}

impl OperationHandle {
    /// Identifier of the operation
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Request cooperative cancellation.
    ///
    /// Takes effect at the operation's next item boundary; the outcome
    /// reports whether cancellation won the race against completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Latest progress snapshot
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.borrow().clone()
    }

    /// Subscribe to progress updates
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    /// Wait for the operation to finish and take its outcome
    pub async fn wait(self) -> Outcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(id = %self.id, error = %e, "operation task aborted");
                failed_outcome(
                    Error::other(format!("operation task aborted: {e}")),
                    BTreeSet::new(),
                    OpStats::new(),
                    Vec::new(),
                    0,
                    0,
                )
            }
        }
    }
}

async fn run_operation(
    op: Op,
    options: ExecutorOptions,
    cancel: CancelToken,
    mut tracker: ProgressTracker,
) -> Outcome {
    match op {
        Op::Copy {
            sources,
            destination,
        } => run_copy(sources, destination, options, cancel, &mut tracker).await,
        Op::Move {
            sources,
            destination,
        } => run_move(sources, destination, options, cancel, &mut tracker).await,
        Op::Delete { paths } => run_delete(paths, options, cancel, &mut tracker).await,
        Op::CreateDir { path } => run_create(path, cancel, &mut tracker).await,
    }
}

async fn run_copy(
    sources: Vec<PathBuf>,
    destination: PathBuf,
    options: ExecutorOptions,
    cancel: CancelToken,
    tracker: &mut ProgressTracker,
) -> Outcome {
    let work = {
        let destination = destination.clone();
        match enumerate(move || plan_copy(&sources, &destination)).await {
            Ok(work) => work,
            Err(e) => return abort_before_execution(e, tracker),
        }
    };
    tracker.set_total(work.total_units(options.weighting));
    if cancel.is_cancelled() {
        return cancelled_before_execution(tracker);
    }
    tracker.set_state(OperationState::Executing);
    debug!(items = work.len(), dest = %destination.display(), "copy starting");

    let mut executor = Executor::new(options, cancel);
    let phase = executor.run_copy(&work.items, &destination, tracker).await;
    let (log, stats) = executor.into_parts();

    match phase {
        CopyPhase::Completed => {
            tracker.set_state(OperationState::Succeeded);
            success_outcome(stats, tracker)
        }
        CopyPhase::Cancelled => {
            tracker.set_state(OperationState::RollingBack);
            let warnings = roll_back(log).await;
            tracker.set_state(OperationState::Cancelled);
            cancelled_outcome(BTreeSet::new(), stats, warnings, tracker)
        }
        CopyPhase::Failed { error, failed_path } => {
            tracker.set_state(OperationState::RollingBack);
            let warnings = roll_back(log).await;
            tracker.set_state(OperationState::Failed);
            failed_outcome(
                error,
                BTreeSet::from([failed_path]),
                stats,
                warnings,
                tracker.completed_units(),
                tracker.total_units(),
            )
        }
    }
}

async fn run_move(
    sources: Vec<PathBuf>,
    destination: PathBuf,
    options: ExecutorOptions,
    cancel: CancelToken,
    tracker: &mut ProgressTracker,
) -> Outcome {
    let work = {
        let destination = destination.clone();
        match enumerate(move || plan_copy(&sources, &destination)).await {
            Ok(work) => work,
            Err(e) => return abort_before_execution(e, tracker),
        }
    };
    // A move is a copy followed by a delete of the originals; the delete
    // half always weighs one unit per entry.
    let copy_units = work.total_units(options.weighting);
    tracker.set_total(copy_units + work.len() as u64);
    if cancel.is_cancelled() {
        return cancelled_before_execution(tracker);
    }
    tracker.set_state(OperationState::Executing);
    debug!(items = work.len(), dest = %destination.display(), "move starting");

    let mut executor = Executor::new(options, cancel);
    let phase = executor.run_copy(&work.items, &destination, tracker).await;

    match phase {
        CopyPhase::Completed => {}
        CopyPhase::Cancelled => {
            let (log, stats) = executor.into_parts();
            tracker.set_state(OperationState::RollingBack);
            let warnings = roll_back(log).await;
            tracker.set_state(OperationState::Cancelled);
            return cancelled_outcome(BTreeSet::new(), stats, warnings, tracker);
        }
        CopyPhase::Failed { error, failed_path } => {
            let (log, stats) = executor.into_parts();
            tracker.set_state(OperationState::RollingBack);
            let warnings = roll_back(log).await;
            tracker.set_state(OperationState::Failed);
            return failed_outcome(
                error,
                BTreeSet::from([failed_path]),
                stats,
                warnings,
                tracker.completed_units(),
                tracker.total_units(),
            );
        }
    }

    // Delete the originals children-first by reversing the copy plan. From
    // here on the copy is never undone: a source that cannot be deleted
    // leaves a duplicate, not a lost file. Sources whose copy was skipped
    // were never delivered, so they and the directories holding them are
    // retained rather than deleted.
    let retained = executor.skipped_sources().clone();
    debug!(retained = retained.len(), "move copy phase complete, deleting sources");
    let delete_items: Vec<_> = work
        .items
        .iter()
        .rev()
        .filter(|item| {
            !retained.iter().any(|kept| kept.starts_with(&item.entry.path))
        })
        .collect();
    let phase = executor.run_delete(delete_items, tracker).await;
    let (_, stats) = executor.into_parts();

    match phase {
        DeletePhase::Completed { mut failed } => {
            failed.extend(retained);
            if failed.is_empty() {
                tracker.set_state(OperationState::Succeeded);
                success_outcome(stats, tracker)
            } else {
                tracker.set_state(OperationState::Failed);
                partial_outcome(failed, stats, tracker)
            }
        }
        DeletePhase::Cancelled { mut failed } => {
            failed.extend(retained);
            tracker.set_state(OperationState::Cancelled);
            cancelled_outcome(failed, stats, Vec::new(), tracker)
        }
    }
}

async fn run_delete(
    paths: Vec<PathBuf>,
    options: ExecutorOptions,
    cancel: CancelToken,
    tracker: &mut ProgressTracker,
) -> Outcome {
    let work = match enumerate(move || plan_delete(&paths)).await {
        Ok(work) => work,
        Err(e) => return abort_before_execution(e, tracker),
    };
    tracker.set_total(work.len() as u64);
    if cancel.is_cancelled() {
        return cancelled_before_execution(tracker);
    }
    tracker.set_state(OperationState::Executing);
    debug!(items = work.len(), "delete starting");

    let mut executor = Executor::new(options, cancel);
    let phase = executor.run_delete(work.items.iter(), tracker).await;
    let (_, stats) = executor.into_parts();

    match phase {
        DeletePhase::Completed { failed } if failed.is_empty() => {
            tracker.set_state(OperationState::Succeeded);
            success_outcome(stats, tracker)
        }
        DeletePhase::Completed { failed } => {
            tracker.set_state(OperationState::Failed);
            partial_outcome(failed, stats, tracker)
        }
        DeletePhase::Cancelled { failed } => {
            tracker.set_state(OperationState::Cancelled);
            cancelled_outcome(failed, stats, Vec::new(), tracker)
        }
    }
}

async fn run_create(path: PathBuf, cancel: CancelToken, tracker: &mut ProgressTracker) -> Outcome {
    tracker.set_total(1);
    if cancel.is_cancelled() {
        return cancelled_before_execution(tracker);
    }
    tracker.set_state(OperationState::Executing);

    match executor::create_directory(&path).await {
        Ok(()) => {
            tracker.advance(1, &path);
            tracker.set_state(OperationState::Succeeded);
            let mut stats = OpStats::new();
            stats.directories_created = 1;
            success_outcome(stats, tracker)
        }
        Err(error) => {
            tracker.set_state(OperationState::Failed);
            failed_outcome(
                error,
                BTreeSet::from([path]),
                OpStats::new(),
                Vec::new(),
                0,
                1,
            )
        }
    }
}

/// Run a blocking enumeration off the async runtime
async fn enumerate<F>(enumerate: F) -> Result<Plan, Error>
where
    F: FnOnce() -> Result<Plan, Error> + Send + 'static,
{
    match tokio::task::spawn_blocking(enumerate).await {
        Ok(result) => result,
        Err(e) => Err(Error::other(format!("enumeration task aborted: {e}"))),
    }
}

fn abort_before_execution(error: Error, tracker: &mut ProgressTracker) -> Outcome {
    tracker.set_state(OperationState::Failed);
    failed_outcome(
        error,
        BTreeSet::new(),
        OpStats::new(),
        Vec::new(),
        tracker.completed_units(),
        tracker.total_units(),
    )
}

fn cancelled_before_execution(tracker: &mut ProgressTracker) -> Outcome {
    tracker.set_state(OperationState::Cancelled);
    cancelled_outcome(BTreeSet::new(), OpStats::new(), Vec::new(), tracker)
}

fn success_outcome(stats: OpStats, tracker: &ProgressTracker) -> Outcome {
    Outcome {
        status: OutcomeStatus::Success,
        failed_paths: BTreeSet::new(),
        stats,
        rollback_warnings: Vec::new(),
        error: None,
        completed_units: tracker.completed_units(),
        total_units: tracker.total_units(),
    }
}

fn partial_outcome(
    failed_paths: BTreeSet<PathBuf>,
    stats: OpStats,
    tracker: &ProgressTracker,
) -> Outcome {
    Outcome {
        status: OutcomeStatus::PartialFailure,
        failed_paths,
        stats,
        rollback_warnings: Vec::new(),
        error: None,
        completed_units: tracker.completed_units(),
        total_units: tracker.total_units(),
    }
}

fn cancelled_outcome(
    failed_paths: BTreeSet<PathBuf>,
    stats: OpStats,
    rollback_warnings: Vec<RollbackWarning>,
    tracker: &ProgressTracker,
) -> Outcome {
    Outcome {
        status: OutcomeStatus::Cancelled,
        failed_paths,
        stats,
        rollback_warnings,
        error: Some(Error::Cancelled),
        completed_units: tracker.completed_units(),
        total_units: tracker.total_units(),
    }
}

fn failed_outcome(
    error: Error,
    failed_paths: BTreeSet<PathBuf>,
    stats: OpStats,
    rollback_warnings: Vec<RollbackWarning>,
    completed_units: u64,
    total_units: u64,
) -> Outcome {
    Outcome {
        status: OutcomeStatus::Failed,
        failed_paths,
        stats,
        rollback_warnings,
        error: Some(error),
        completed_units,
        total_units,
    }
}
