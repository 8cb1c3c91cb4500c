//! Cooperative cancellation for running operations
//!
//! Cancellation is a one-way flag from the caller to the worker, checked at
//! work-item boundaries only. A large single-file copy is not interruptible
//! mid-stream; worst-case cancellation latency is bounded by one file's
//! transfer time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cooperative cancellation token shared between a caller and one worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; the token can never be unset.
    pub fn cancel(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            debug!("cancellation requested");
        }
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_unset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());

        // Idempotent.
        token.cancel();
        assert!(token.is_cancelled());
    }
}
