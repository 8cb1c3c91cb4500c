//! Compensating rollback of a partially completed copy
//!
//! Replays the action log in strict reverse order, undoing each recorded
//! action. Reverse order guarantees a file copied into a created directory
//! is removed before the directory itself. Rollback is best-effort: an
//! entry that cannot be undone is reported as a warning and the replay
//! continues with the rest of the log.

use batchfs_types::{ActionLog, ActionLogEntry, RollbackWarning};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Undo every logged action, newest first.
///
/// Returns the warnings for entries that could not be undone; an empty
/// vector means the destination was restored exactly.
pub(crate) async fn roll_back(log: ActionLog) -> Vec<RollbackWarning> {
    let mut warnings = Vec::new();
    let entries = log.into_entries();
    debug!(actions = entries.len(), "rolling back");

    for entry in entries.into_iter().rev() {
        match entry {
            ActionLogEntry::CopiedFile(path) => {
                if let Err(e) = remove_copied_file(&path).await {
                    push_warning(&mut warnings, &path, &e, "could not remove copied file");
                }
            }
            ActionLogEntry::CreatedDirectory(path) => {
                if let Err(e) = remove_created_directory(&path).await {
                    push_warning(&mut warnings, &path, &e, "could not remove created directory");
                }
            }
            // Deletions are not compensable; they only appear in delete
            // phases, which never roll back.
            ActionLogEntry::DeletedEntry(path) => {
                warn!(path = %path.display(), "deletion in rollback log ignored");
            }
        }
    }

    if warnings.is_empty() {
        debug!("rollback complete");
    } else {
        warn!(leftovers = warnings.len(), "rollback left residue behind");
    }
    warnings
}

async fn remove_copied_file(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed copied file");
            Ok(())
        }
        // Already gone means the goal state holds.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "copied file already gone");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn remove_created_directory(path: &Path) -> io::Result<()> {
    // Only remove the directory if it is empty. Anything still inside it
    // was not created by this operation (or failed to roll back) and must
    // not be destroyed.
    match tokio::fs::read_dir(path).await {
        Ok(mut contents) => {
            if contents.next_entry().await?.is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "directory is not empty",
                ));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "created directory already gone");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    tokio::fs::remove_dir(path).await?;
    debug!(path = %path.display(), "removed created directory");
    Ok(())
}

fn push_warning(warnings: &mut Vec<RollbackWarning>, path: &Path, error: &io::Error, what: &str) {
    warn!(path = %path.display(), error = %error, "{}", what);
    warnings.push(RollbackWarning {
        path: path.to_path_buf(),
        message: format!("{what}: {error}"),
    });
}
