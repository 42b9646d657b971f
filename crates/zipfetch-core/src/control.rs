//! Batch-wide cancellation.
//!
//! One token is shared by every worker. Raising it stops queued tasks from
//! starting and aborts in-flight transfers through curl's progress callback;
//! each affected descriptor then reports `TransferOutcome::Cancelled`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the whole batch. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
