//! Ordered filesystem enumeration for batchfs operations
//!
//! Given one or more source entries, this crate produces the depth-first
//! work list every other engine component relies on. Enumeration is
//! read-only and side-effect free: any unreadable source fails the whole
//! plan before a single byte is mutated.
//!
//! Two orders exist because the operations need opposite guarantees:
//!
//! - [`WalkOrder::ParentsFirst`] (copy): a directory's item precedes its
//!   contents, so destination directories exist before files land in them
//! - [`WalkOrder::ChildrenFirst`] (delete): a directory's item follows its
//!   contents, so it is empty by the time it is removed
//!
//! Symbolic links are leaf entries and are never traversed into, which
//! bounds the walk and avoids cycles.

#![deny(missing_docs)]
#![warn(clippy::all)]

use batchfs_types::{Entry, EntryKind, Error, ProgressWeighting, Result, WorkItem};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Traversal order of a work list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    /// Pre-order: a directory precedes its descendants (copy, create)
    ParentsFirst,
    /// Post-order: a directory follows its descendants (delete)
    ChildrenFirst,
}

/// An ordered work list covering every entry under the enumerated sources
#[derive(Debug)]
pub struct Plan {
    /// Work items in execution order
    pub items: Vec<WorkItem>,
    /// Sum of file sizes across the plan
    pub total_bytes: u64,
}

impl Plan {
    /// Number of work items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the plan contains no work
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total progress units under the given weighting.
    ///
    /// Fixed once enumeration completes; the executor never recomputes it.
    pub fn total_units(&self, weighting: ProgressWeighting) -> u64 {
        self.items.iter().map(|item| item.weight(weighting)).sum()
    }
}

/// Enumerate `sources` into an ordered plan.
///
/// Each source contributes a subtree rooted at its own file name, so a
/// source `/a/b` yields relative paths `b`, `b/c`, and so on.
pub fn plan(sources: &[PathBuf], order: WalkOrder) -> Result<Plan> {
    let mut items = Vec::new();
    let mut total_bytes = 0u64;

    for source in sources {
        let base = source.file_name().map(PathBuf::from).ok_or_else(|| {
            Error::enumeration(source.clone(), "source path has no final component")
        })?;

        let walker = WalkDir::new(source)
            .follow_links(false)
            .contents_first(matches!(order, WalkOrder::ChildrenFirst));

        for dir_entry in walker {
            let dir_entry = dir_entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| source.clone(), Path::to_path_buf);
                Error::enumeration(path, e.to_string())
            })?;

            let path = dir_entry.path();
            // follow_links is off, so this metadata never goes through a
            // symlink and a link to a directory stays a leaf.
            let metadata = dir_entry
                .metadata()
                .map_err(|e| Error::enumeration(path.to_path_buf(), e.to_string()))?;

            let kind = if dir_entry.path_is_symlink() {
                EntryKind::Symlink
            } else if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let size = if kind == EntryKind::File {
                metadata.len()
            } else {
                0
            };

            let relative_path = match path.strip_prefix(source) {
                Ok(rest) if rest.as_os_str().is_empty() => base.clone(),
                Ok(rest) => base.join(rest),
                Err(_) => base.clone(),
            };

            trace!(path = %path.display(), ?kind, depth = dir_entry.depth(), "enumerated entry");
            total_bytes += size;
            items.push(WorkItem {
                entry: Entry::new(path, kind, size).with_modified(metadata.modified().ok()),
                relative_path,
                depth: dir_entry.depth(),
            });
        }
    }

    debug!(
        items = items.len(),
        total_bytes, ?order, "enumeration complete"
    );
    Ok(Plan { items, total_bytes })
}

/// Enumerate sources for a copy into `destination`.
///
/// Parents-first order, plus two up-front checks: the destination root must
/// be an existing directory, and it must not lie inside any source tree
/// (the copy would otherwise recurse into its own output).
pub fn plan_copy(sources: &[PathBuf], destination: &Path) -> Result<Plan> {
    if !destination.is_dir() {
        return Err(Error::enumeration(
            destination.to_path_buf(),
            "destination is not an existing directory",
        ));
    }
    for source in sources {
        if destination.starts_with(source) {
            return Err(Error::enumeration(
                source.clone(),
                format!(
                    "destination '{}' lies inside this source",
                    destination.display()
                ),
            ));
        }
    }
    plan(sources, WalkOrder::ParentsFirst)
}

/// Enumerate paths for an in-place delete, children-first.
pub fn plan_delete(paths: &[PathBuf]) -> Result<Plan> {
    plan(paths, WalkOrder::ChildrenFirst)
}
