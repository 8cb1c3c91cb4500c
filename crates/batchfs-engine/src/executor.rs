//! Work-list execution against the filesystem
//!
//! The executor consumes an enumerated work list for one operation kind at
//! a time and records every completed mutation in an append-only
//! [`ActionLog`]. Error policy differs per operation: a per-item error
//! during copy is fatal and hands the log to rollback, while a per-item
//! error during delete is recorded and the sweep continues with the rest of
//! the tree.

use crate::cancel::CancelToken;
use crate::progress::ProgressTracker;
use batchfs_types::{
    ActionLog, ActionLogEntry, ConflictPolicy, EntryKind, Error, OpStats, ProgressWeighting,
    WorkItem,
};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-run behaviour knobs, resolved from configuration and the request
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExecutorOptions {
    pub conflict: ConflictPolicy,
    pub weighting: ProgressWeighting,
    pub preserve_mtime: bool,
}

/// How a copy phase ended
#[derive(Debug)]
pub(crate) enum CopyPhase {
    /// Every item completed
    Completed,
    /// Cancellation observed at an item boundary; the log is intact
    Cancelled,
    /// A per-item error stopped the phase; the log is intact for rollback
    Failed {
        error: Error,
        failed_path: PathBuf,
    },
}

/// How a delete phase ended
#[derive(Debug)]
pub(crate) enum DeletePhase {
    /// Every item was attempted; `failed` holds the paths that could not be
    /// deleted
    Completed { failed: BTreeSet<PathBuf> },
    /// Cancellation observed; already-deleted entries stay deleted
    Cancelled { failed: BTreeSet<PathBuf> },
}

/// Executes one operation's work list and records its side effects
#[derive(Debug)]
pub(crate) struct Executor {
    options: ExecutorOptions,
    cancel: CancelToken,
    log: ActionLog,
    stats: OpStats,
    skipped: BTreeSet<PathBuf>,
}

impl Executor {
    pub fn new(options: ExecutorOptions, cancel: CancelToken) -> Self {
        Self {
            options,
            cancel,
            log: ActionLog::new(),
            stats: OpStats::new(),
            skipped: BTreeSet::new(),
        }
    }

    /// Hand over the action log and counters once the run has stopped
    pub fn into_parts(self) -> (ActionLog, OpStats) {
        (self.log, self.stats)
    }

    /// Run a parents-first copy of `items` under `destination`.
    ///
    /// Stops at the first per-item error or at the first item boundary
    /// where cancellation is observed; in both cases the action log stays
    /// intact for the rollback controller.
    pub async fn run_copy(
        &mut self,
        items: &[WorkItem],
        destination: &Path,
        progress: &mut ProgressTracker,
    ) -> CopyPhase {
        for item in items {
            if self.cancel.is_cancelled() {
                debug!(completed = self.log.len(), "copy cancelled at item boundary");
                return CopyPhase::Cancelled;
            }

            let dest = destination.join(&item.relative_path);
            let result = match item.entry.kind {
                EntryKind::Directory => self.copy_directory(item, &dest).await,
                EntryKind::File => self.copy_file(item, &dest).await,
                EntryKind::Symlink => self.copy_symlink(item, &dest).await,
            };

            match result {
                Ok(()) => {
                    progress.advance(item.weight(self.options.weighting), &item.entry.path);
                }
                Err(error) => {
                    return CopyPhase::Failed {
                        error,
                        failed_path: item.entry.path.clone(),
                    };
                }
            }
        }
        CopyPhase::Completed
    }

    async fn copy_directory(&mut self, item: &WorkItem, dest: &Path) -> Result<(), Error> {
        match tokio::fs::metadata(dest).await {
            Ok(existing) if existing.is_dir() => {
                // An existing directory is only a conflict under `fail`;
                // otherwise the trees merge and nothing is logged, so
                // rollback never removes a directory it did not create.
                if self.options.conflict == ConflictPolicy::Fail {
                    return Err(Error::DestinationExists {
                        path: dest.to_path_buf(),
                    });
                }
                debug!(path = %dest.display(), "destination directory exists, merging");
                Ok(())
            }
            Ok(_) => {
                // A non-directory stands where the directory must go.
                // Skipping would strand every descendant, so only
                // `overwrite` can proceed here.
                if self.options.conflict != ConflictPolicy::Overwrite {
                    return Err(Error::DestinationExists {
                        path: dest.to_path_buf(),
                    });
                }
                tokio::fs::remove_file(dest).await.map_err(|e| {
                    Error::classify_io(item.entry.path.clone(), &e, |path, message| {
                        Error::DirectoryCreationFailed { path, message }
                    })
                })?;
                self.create_logged_directory(item, dest).await
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.create_logged_directory(item, dest).await
            }
            Err(e) => Err(Error::classify_io(item.entry.path.clone(), &e, |path, message| {
                Error::DirectoryCreationFailed { path, message }
            })),
        }
    }

    async fn create_logged_directory(&mut self, item: &WorkItem, dest: &Path) -> Result<(), Error> {
        tokio::fs::create_dir(dest).await.map_err(|e| {
            classify_mutation(&item.entry.path, &e, |path, message| {
                Error::DirectoryCreationFailed { path, message }
            })
        })?;
        self.log
            .record(ActionLogEntry::CreatedDirectory(dest.to_path_buf()));
        self.stats.directories_created += 1;
        debug!(path = %dest.display(), "created directory");
        Ok(())
    }

    async fn copy_file(&mut self, item: &WorkItem, dest: &Path) -> Result<(), Error> {
        match self.resolve_leaf_conflict(item, dest).await? {
            LeafDisposition::Skip => return Ok(()),
            LeafDisposition::Proceed => {}
        }

        let bytes = tokio::fs::copy(&item.entry.path, dest).await.map_err(|e| {
            classify_mutation(&item.entry.path, &e, |path, message| Error::FileCopyFailed {
                path,
                message,
            })
        })?;

        self.log.record(ActionLogEntry::CopiedFile(dest.to_path_buf()));
        self.stats.files_copied += 1;
        self.stats.bytes_copied += bytes;
        debug!(source = %item.entry.path.display(), dest = %dest.display(), bytes, "copied file");

        if self.options.preserve_mtime {
            if let Some(modified) = item.entry.modified {
                let mtime = filetime::FileTime::from_system_time(modified);
                if let Err(e) = filetime::set_file_mtime(dest, mtime) {
                    warn!(path = %dest.display(), error = %e, "could not preserve mtime");
                }
            }
        }
        Ok(())
    }

    async fn copy_symlink(&mut self, item: &WorkItem, dest: &Path) -> Result<(), Error> {
        match self.resolve_leaf_conflict(item, dest).await? {
            LeafDisposition::Skip => return Ok(()),
            LeafDisposition::Proceed => {}
        }

        #[cfg(unix)]
        {
            let target = tokio::fs::read_link(&item.entry.path).await.map_err(|e| {
                classify_mutation(&item.entry.path, &e, |path, message| Error::FileCopyFailed {
                    path,
                    message,
                })
            })?;
            // symlink creation refuses existing destinations; clear an
            // overwritten one first.
            let _ = tokio::fs::remove_file(dest).await;
            tokio::fs::symlink(&target, dest).await.map_err(|e| {
                classify_mutation(&item.entry.path, &e, |path, message| Error::FileCopyFailed {
                    path,
                    message,
                })
            })?;
            self.log.record(ActionLogEntry::CopiedFile(dest.to_path_buf()));
            self.stats.files_copied += 1;
            debug!(source = %item.entry.path.display(), dest = %dest.display(), "recreated symlink");
            Ok(())
        }

        #[cfg(not(unix))]
        {
            warn!(path = %item.entry.path.display(), "symlink copy unsupported on this platform, skipping");
            self.record_skip(item);
            Ok(())
        }
    }

    /// Apply the conflict policy to a file or symlink destination
    async fn resolve_leaf_conflict(
        &mut self,
        item: &WorkItem,
        dest: &Path,
    ) -> Result<LeafDisposition, Error> {
        match tokio::fs::symlink_metadata(dest).await {
            Ok(existing) => match self.options.conflict {
                ConflictPolicy::Fail => Err(Error::DestinationExists {
                    path: dest.to_path_buf(),
                }),
                ConflictPolicy::Skip => {
                    debug!(path = %dest.display(), "destination exists, skipping");
                    self.record_skip(item);
                    Ok(LeafDisposition::Skip)
                }
                ConflictPolicy::Overwrite => {
                    // A directory standing at the leaf's destination must
                    // be cleared before the copy; a plain file is replaced
                    // by the copy itself.
                    if existing.is_dir() {
                        tokio::fs::remove_dir_all(dest).await.map_err(|e| {
                            Error::classify_io(dest.to_path_buf(), &e, |path, message| {
                                Error::FileCopyFailed { path, message }
                            })
                        })?;
                        debug!(path = %dest.display(), "replaced directory at leaf destination");
                    }
                    Ok(LeafDisposition::Proceed)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LeafDisposition::Proceed),
            Err(e) => Err(Error::classify_io(dest.to_path_buf(), &e, |path, message| {
                Error::FileCopyFailed { path, message }
            })),
        }
    }

    fn record_skip(&mut self, item: &WorkItem) {
        self.stats.entries_skipped += 1;
        self.skipped.insert(item.entry.path.clone());
    }

    /// Source paths whose copy was skipped under the `skip` policy.
    ///
    /// Their bytes were never delivered to the destination, so a move must
    /// not delete these originals.
    pub fn skipped_sources(&self) -> &BTreeSet<PathBuf> {
        &self.skipped
    }

    /// Run a children-first delete over `items`.
    ///
    /// Per-item failures are independent: a locked file must not block
    /// deletion of the rest of the tree, so errors are recorded and the
    /// sweep continues. Progress weighs one unit per entry regardless of
    /// the configured weighting.
    pub async fn run_delete(
        &mut self,
        items: impl IntoIterator<Item = &WorkItem>,
        progress: &mut ProgressTracker,
    ) -> DeletePhase {
        let mut failed = BTreeSet::new();

        for item in items {
            if self.cancel.is_cancelled() {
                debug!(deleted = self.stats.entries_deleted, "delete cancelled at item boundary");
                return DeletePhase::Cancelled { failed };
            }

            let path = &item.entry.path;
            let result = match item.entry.kind {
                EntryKind::Directory => tokio::fs::remove_dir(path).await,
                EntryKind::File | EntryKind::Symlink => tokio::fs::remove_file(path).await,
            };

            match result {
                Ok(()) => {
                    self.log.record(ActionLogEntry::DeletedEntry(path.clone()));
                    self.stats.entries_deleted += 1;
                    progress.advance(1, path);
                }
                Err(e) => {
                    let error = Error::classify_io(path.clone(), &e, |path, message| {
                        Error::FileDeleteFailed { path, message }
                    });
                    warn!(path = %path.display(), error = %error, "delete failed, continuing");
                    failed.insert(path.clone());
                }
            }
        }
        DeletePhase::Completed { failed }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &OpStats {
        &self.stats
    }
}

enum LeafDisposition {
    Proceed,
    Skip,
}

/// Create a single directory, the `Create` operation's whole body.
///
/// No partial state exists on failure, so nothing is logged for rollback.
pub(crate) async fn create_directory(path: &Path) -> Result<(), Error> {
    tokio::fs::create_dir(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => Error::PermissionDenied {
            path: path.to_path_buf(),
        },
        io::ErrorKind::AlreadyExists => Error::DestinationExists {
            path: path.to_path_buf(),
        },
        _ => Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })
}

/// Classify an error from a mutating call against the source entry it was
/// working on, so outcome reporting names the item that failed.
fn classify_mutation<F>(source: &Path, error: &io::Error, fallback: F) -> Error
where
    F: FnOnce(PathBuf, String) -> Error,
{
    Error::classify_io(source.to_path_buf(), error, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchfs_walk::{plan, plan_delete, WalkOrder};
    use std::fs;
    use tempfile::TempDir;

    fn options() -> ExecutorOptions {
        ExecutorOptions {
            conflict: ConflictPolicy::Fail,
            weighting: ProgressWeighting::Items,
            preserve_mtime: false,
        }
    }

    fn tracker_with_total(total: u64) -> ProgressTracker {
        let (mut tracker, _rx) = ProgressTracker::new();
        tracker.set_total(total);
        tracker
    }

    #[tokio::test]
    async fn test_copy_records_actions_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"alpha").unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), CancelToken::new());

        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;
        assert!(matches!(phase, CopyPhase::Completed));

        let (log, stats) = executor.into_parts();
        let entries = log.into_entries();
        assert_eq!(
            entries,
            vec![
                ActionLogEntry::CreatedDirectory(dest.join("src")),
                ActionLogEntry::CopiedFile(dest.join("src/a.txt")),
            ]
        );
        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.directories_created, 1);
        assert_eq!(stats.bytes_copied, 5);
        assert_eq!(fs::read(dest.join("src/a.txt")).unwrap(), b"alpha");
    }

    #[tokio::test]
    async fn test_copy_stops_on_vanished_source() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"a").unwrap();
        fs::write(tmp.path().join("src/b.txt"), b"b").unwrap();
        fs::write(tmp.path().join("src/c.txt"), b"c").unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        // The entry vanishes between enumeration and execution.
        let victim = work
            .items
            .iter()
            .find(|item| item.entry.path.ends_with("b.txt"))
            .unwrap()
            .entry
            .path
            .clone();
        fs::remove_file(&victim).unwrap();

        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), CancelToken::new());
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;

        match phase {
            CopyPhase::Failed { error, failed_path } => {
                assert!(matches!(error, Error::SourceVanished { .. }));
                assert_eq!(failed_path, victim);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // Work after the failing item never ran.
        assert!(!dest.join("src/c.txt").exists());
    }

    #[tokio::test]
    async fn test_copy_conflict_policies_on_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"new contents").unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir_all(dest.join("src")).unwrap();
        fs::write(dest.join("src/a.txt"), b"old").unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();

        // fail: aborts on the collision
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(
            ExecutorOptions {
                conflict: ConflictPolicy::Fail,
                ..options()
            },
            CancelToken::new(),
        );
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;
        assert!(
            matches!(phase, CopyPhase::Failed { error: Error::DestinationExists { .. }, .. }),
            "got {phase:?}"
        );

        // skip: leaves the old file alone
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(
            ExecutorOptions {
                conflict: ConflictPolicy::Skip,
                ..options()
            },
            CancelToken::new(),
        );
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;
        assert!(matches!(phase, CopyPhase::Completed));
        assert_eq!(fs::read(dest.join("src/a.txt")).unwrap(), b"old");
        assert_eq!(executor.stats().entries_skipped, 1);

        // overwrite: replaces it
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(
            ExecutorOptions {
                conflict: ConflictPolicy::Overwrite,
                ..options()
            },
            CancelToken::new(),
        );
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;
        assert!(matches!(phase, CopyPhase::Completed));
        assert_eq!(fs::read(dest.join("src/a.txt")).unwrap(), b"new contents");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_directory_at_leaf_destination() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"fresh bytes").unwrap();
        let dest = tmp.path().join("dest");
        // A non-empty directory stands exactly where the file must land.
        fs::create_dir_all(dest.join("src/a.txt")).unwrap();
        fs::write(dest.join("src/a.txt/stale"), b"stale").unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(
            ExecutorOptions {
                conflict: ConflictPolicy::Overwrite,
                ..options()
            },
            CancelToken::new(),
        );
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;

        assert!(matches!(phase, CopyPhase::Completed), "got {phase:?}");
        assert!(dest.join("src/a.txt").is_file());
        assert_eq!(fs::read(dest.join("src/a.txt")).unwrap(), b"fresh bytes");
    }

    #[tokio::test]
    async fn test_skip_records_retained_sources() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"unique").unwrap();
        fs::write(tmp.path().join("src/b.txt"), b"moves").unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir_all(dest.join("src")).unwrap();
        fs::write(dest.join("src/a.txt"), b"old").unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(
            ExecutorOptions {
                conflict: ConflictPolicy::Skip,
                ..options()
            },
            CancelToken::new(),
        );
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;

        assert!(matches!(phase, CopyPhase::Completed));
        let skipped = executor.skipped_sources();
        assert_eq!(skipped.len(), 1);
        assert!(skipped.contains(&tmp.path().join("src/a.txt")));
        assert_eq!(executor.stats().entries_skipped, 1);
    }

    #[tokio::test]
    async fn test_copy_cancelled_before_first_item() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"a").unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), cancel);
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;

        assert!(matches!(phase, CopyPhase::Cancelled));
        let (log, _) = executor.into_parts();
        assert!(log.is_empty());
        assert!(fs::read_dir(&dest).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_delete_continues_past_failures() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"a").unwrap();
        fs::write(tmp.path().join("src/b.txt"), b"b").unwrap();

        let work = plan_delete(&[tmp.path().join("src")]).unwrap();
        // One entry vanishes before execution; its deletion fails but the
        // sweep must attempt everything else.
        let victim = tmp.path().join("src/a.txt");
        fs::remove_file(&victim).unwrap();

        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), CancelToken::new());
        let phase = executor.run_delete(work.items.iter(), &mut tracker).await;

        match phase {
            DeletePhase::Completed { failed } => {
                assert_eq!(failed.len(), 1);
                assert!(failed.contains(&victim));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(!tmp.path().join("src").exists());
        assert_eq!(executor.stats().entries_deleted, 2);
    }

    #[tokio::test]
    async fn test_undeletable_entry_fails_its_ancestors_too() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/sub")).unwrap();
        fs::write(tmp.path().join("src/sub/stuck.txt"), b"stuck").unwrap();
        fs::write(tmp.path().join("src/free.txt"), b"free").unwrap();

        let work = plan_delete(&[tmp.path().join("src")]).unwrap();
        // After enumeration the entry turns into a non-empty directory, so
        // its unlink fails, and every ancestor then fails non-empty.
        let stuck = tmp.path().join("src/sub/stuck.txt");
        fs::remove_file(&stuck).unwrap();
        fs::create_dir(&stuck).unwrap();
        fs::write(stuck.join("inner"), b"x").unwrap();

        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), CancelToken::new());
        let phase = executor.run_delete(work.items.iter(), &mut tracker).await;

        match phase {
            DeletePhase::Completed { failed } => {
                assert!(failed.contains(&stuck));
                assert!(failed.contains(&tmp.path().join("src/sub")));
                assert!(failed.contains(&tmp.path().join("src")));
                assert_eq!(failed.len(), 3);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        // The independent sibling was still attempted and deleted.
        assert!(!tmp.path().join("src/free.txt").exists());
        assert_eq!(executor.stats().entries_deleted, 1);
    }

    #[tokio::test]
    async fn test_delete_cancelled_at_item_boundary() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.txt"), b"a").unwrap();

        let work = plan_delete(&[tmp.path().join("src")]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), cancel);
        let phase = executor.run_delete(work.items.iter(), &mut tracker).await;

        match phase {
            DeletePhase::Cancelled { failed } => assert!(failed.is_empty()),
            other => panic!("expected cancellation, got {other:?}"),
        }
        // Nothing was attempted past the boundary.
        assert!(tmp.path().join("src/a.txt").exists());
        assert_eq!(executor.stats().entries_deleted, 0);
    }

    #[tokio::test]
    async fn test_create_directory_reports_collision() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fresh");

        create_directory(&path).await.unwrap();
        assert!(path.is_dir());

        let err = create_directory(&path).await.unwrap_err();
        assert!(matches!(err, Error::DestinationExists { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_recreates_symlinks() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink("real.txt", tmp.path().join("src/link")).unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let work = plan(&[tmp.path().join("src")], WalkOrder::ParentsFirst).unwrap();
        let mut tracker = tracker_with_total(work.len() as u64);
        let mut executor = Executor::new(options(), CancelToken::new());
        let phase = executor.run_copy(&work.items, &dest, &mut tracker).await;

        assert!(matches!(phase, CopyPhase::Completed));
        let copied = dest.join("src/link");
        assert_eq!(fs::read_link(&copied).unwrap(), PathBuf::from("real.txt"));
        assert_eq!(fs::read(&copied).unwrap(), b"real");
    }
}
