//! Shared FIFO of pending tasks plus the in-flight slot count.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::control::CancelToken;
use crate::task::Task;

/// Longest a worker sleeps without re-checking the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Task>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Pending tasks and in-flight count behind one mutex. Workers block in
/// [`next`](Self::next) until a task is ready or all work is done.
#[derive(Debug, Default)]
pub(crate) struct WorkQueue {
    state: Mutex<QueueState>,
    changed: Condvar,
}

/// An occupied worker slot. Dropping it frees the slot, also when the worker
/// unwinds, so the remaining workers never wait on a slot that will not free.
pub(crate) struct Slot<'q> {
    queue: &'q WorkQueue,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        let mut st = self.queue.lock();
        st.in_flight -= 1;
        drop(st);
        self.queue.changed.notify_all();
    }
}

impl WorkQueue {
    pub(crate) fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: tasks.into_iter().collect(),
                ..QueueState::default()
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the oldest task whose backoff has elapsed and occupies a slot for it.
    ///
    /// Returns `None` once nothing is pending and no slot is occupied: at that
    /// point no retry can be enqueued any more. While cancelled, backoff is
    /// ignored so queued tasks drain immediately.
    pub(crate) fn next(&self, cancel: &CancelToken) -> Option<(Task, Slot<'_>)> {
        let mut st = self.lock();
        loop {
            let now = Instant::now();
            let cancelled = cancel.is_cancelled();
            let ready = st
                .pending
                .iter()
                .position(|t| cancelled || t.is_ready(now));
            if let Some(task) = ready.and_then(|pos| st.pending.remove(pos)) {
                st.in_flight += 1;
                st.peak_in_flight = st.peak_in_flight.max(st.in_flight);
                return Some((task, Slot { queue: self }));
            }
            if st.pending.is_empty() && st.in_flight == 0 {
                return None;
            }
            let wait = st
                .pending
                .iter()
                .map(|t| t.ready_at.saturating_duration_since(now))
                .min()
                .unwrap_or(CANCEL_POLL)
                .min(CANCEL_POLL);
            st = self
                .changed
                .wait_timeout(st, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Appends a retried task at the back. Call before dropping the slot of
    /// the attempt that produced it.
    pub(crate) fn push_back(&self, task: Task) {
        self.lock().pending.push_back(task);
        self.changed.notify_all();
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.lock().peak_in_flight
    }
}
