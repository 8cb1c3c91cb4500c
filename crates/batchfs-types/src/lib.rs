//! Core type system and error handling for batchfs
//!
//! This crate provides the foundational types shared across the batchfs
//! workspace:
//!
//! - **Error handling**: the operation error taxonomy with I/O
//!   classification helpers
//! - **Data model**: entry snapshots, work items, the append-only action
//!   log, progress snapshots, and terminal outcomes
//!
//! # Features
//!
//! - `serde`: enable serialization support on the data model
//!
//! # Examples
//!
//! ```rust
//! use batchfs_types::{ActionLog, ActionLogEntry};
//! use std::path::PathBuf;
//!
//! fn record_copy(log: &mut ActionLog, dest: PathBuf) {
//!     log.record(ActionLogEntry::CopiedFile(dest));
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = OpStats::new();
        assert_eq!(stats.files_copied, 0);
        assert_eq!(stats.bytes_copied, 0);
    }

    #[test]
    fn test_error_reexport() {
        let err = Error::config("bad value");
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
