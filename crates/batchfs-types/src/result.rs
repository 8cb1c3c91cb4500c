//! Result type alias for batchfs operations

use crate::Error;

/// Result type alias for batchfs operations
pub type Result<T> = std::result::Result<T, Error>;
