//! Batch controller: runs a list of descriptors through a fixed pool of
//! worker threads.
//!
//! - At most `concurrency` attempts run at once.
//! - Ready tasks start in FIFO order; a failed attempt goes to the back of
//!   the queue once its backoff has elapsed.
//! - A descriptor has at most one attempt in flight; its retry is enqueued
//!   only after the previous attempt returned.
//! - Every descriptor gets exactly one terminal `on_step`, from the calling
//!   thread, then `on_finish` fires once.

mod queue;
mod worker;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use crate::catalogue::{dedup_descriptors, Conflict, Deduped, DownloadDescriptor};
use crate::control::CancelToken;
use crate::outcome::{SkipReason, TransferOutcome};
use crate::progress::{BatchSummary, ProgressSink};
use crate::retry::TransferError;
use crate::retry::RetryScheduler;
use crate::task::Task;
use crate::transfer::TransferExecutor;

use queue::WorkQueue;
use worker::{Report, Worker};

/// Default number of simultaneous transfers.
pub const DEFAULT_CONCURRENCY: usize = 5;

pub struct DownloadManager<E> {
    executor: E,
    concurrency: usize,
    scheduler: RetryScheduler,
    cancel: CancelToken,
}

impl<E: TransferExecutor> DownloadManager<E> {
    /// `concurrency` below 1 is treated as 1.
    pub fn new(executor: E, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
            scheduler: RetryScheduler::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: RetryScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Use an externally owned token (e.g. raised by a Ctrl-C handler).
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the whole batch and blocks until every descriptor is terminal.
    pub fn run(
        &self,
        descriptors: Vec<DownloadDescriptor>,
        sink: &mut dyn ProgressSink,
    ) -> BatchSummary {
        let started = Instant::now();
        let total = descriptors.len();
        let Deduped { unique, conflicts } = dedup_descriptors(descriptors);
        let mut summary = BatchSummary::new(total);
        sink.on_start(total);

        // Held-back entries are terminal right away.
        for (descriptor, conflict) in conflicts {
            let outcome = conflict_outcome(conflict);
            summary.record(&descriptor, &outcome);
            sink.on_step(&descriptor, &outcome);
        }
        if unique.is_empty() {
            summary.elapsed = started.elapsed();
            sink.on_finish(&summary);
            return summary;
        }
        let workers = self.concurrency.min(unique.len());
        let queue = WorkQueue::new(unique.into_iter().map(|d| Task::first(Arc::new(d))));
        tracing::info!(total, workers, "starting batch");

        let (tx, rx) = mpsc::channel::<Report>();
        std::thread::scope(|scope| {
            for id in 0..workers {
                let worker = Worker {
                    id,
                    queue: &queue,
                    executor: &self.executor,
                    scheduler: &self.scheduler,
                    cancel: &self.cancel,
                    reports: tx.clone(),
                };
                scope.spawn(move || worker.run());
            }
            drop(tx);

            for report in rx {
                summary.record(&report.descriptor, &report.outcome);
                sink.on_step(&report.descriptor, &report.outcome);
            }
        });

        summary.peak_concurrency = queue.peak_in_flight();
        summary.elapsed = started.elapsed();
        if summary.finished() != total {
            tracing::error!(
                total,
                finished = summary.finished(),
                "batch ended with descriptors missing an outcome"
            );
        }
        sink.on_finish(&summary);
        summary
    }
}

fn conflict_outcome(conflict: Conflict) -> TransferOutcome {
    match conflict {
        Conflict::DuplicateKey => TransferOutcome::Skipped(SkipReason::Duplicate),
        Conflict::LocalName { name, owner } => TransferOutcome::ExhaustedRetries {
            error: TransferError::NameCollision { name, owner },
            attempts: 0,
        },
    }
}
