//! Unit of work inside the controller's queue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalogue::DownloadDescriptor;

/// A descriptor plus how many attempts it has already used.
#[derive(Debug, Clone)]
pub struct Task {
    pub descriptor: Arc<DownloadDescriptor>,
    /// 0 on first enqueue; +1 per retry.
    pub attempt: u32,
    /// Earliest instant this task may start (backoff after a failure).
    pub ready_at: Instant,
}

impl Task {
    pub fn first(descriptor: Arc<DownloadDescriptor>) -> Self {
        Self {
            descriptor,
            attempt: 0,
            ready_at: Instant::now(),
        }
    }

    /// The follow-up task after a failed attempt.
    pub fn retry_after(self, delay: Duration) -> Self {
        Self {
            descriptor: self.descriptor,
            attempt: self.attempt + 1,
            ready_at: Instant::now() + delay,
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.ready_at <= now
    }
}
