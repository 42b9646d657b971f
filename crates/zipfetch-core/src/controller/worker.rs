//! One worker thread: pull a task, run one attempt, requeue or report.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::catalogue::DownloadDescriptor;
use crate::control::CancelToken;
use crate::outcome::TransferOutcome;
use crate::retry::{Next, RetryScheduler};
use crate::transfer::TransferExecutor;

use super::queue::WorkQueue;

/// Terminal outcome for one descriptor, sent to the thread that owns the sink.
pub(crate) struct Report {
    pub descriptor: Arc<DownloadDescriptor>,
    pub outcome: TransferOutcome,
}

pub(crate) struct Worker<'a, E: ?Sized> {
    pub id: usize,
    pub queue: &'a WorkQueue,
    pub executor: &'a E,
    pub scheduler: &'a RetryScheduler,
    pub cancel: &'a CancelToken,
    pub reports: Sender<Report>,
}

impl<E: TransferExecutor + ?Sized> Worker<'_, E> {
    pub(crate) fn run(self) {
        tracing::trace!(worker = self.id, "worker started");
        while let Some((task, slot)) = self.queue.next(self.cancel) {
            let outcome = if self.cancel.is_cancelled() {
                TransferOutcome::Cancelled
            } else {
                self.executor
                    .attempt(&task.descriptor, task.attempt, self.cancel)
            };
            let descriptor = Arc::clone(&task.descriptor);
            match self.scheduler.after_attempt(task, outcome) {
                Next::Requeue(next) => self.queue.push_back(next),
                Next::Done(outcome) => {
                    if self.reports.send(Report { descriptor, outcome }).is_err() {
                        tracing::debug!(worker = self.id, "report receiver gone");
                    }
                }
            }
            // Released only after a retry is queued, so idle workers cannot
            // see an empty queue with nothing in flight while it is pending.
            drop(slot);
        }
        tracing::trace!(worker = self.id, "worker finished");
    }
}
