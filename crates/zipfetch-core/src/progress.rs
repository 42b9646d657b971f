//! Progress reporting for a batch.
//!
//! The controller calls a [`ProgressSink`] once at start with the total, once
//! per descriptor when it reaches a terminal outcome, and once at the end.
//! Rendering (progress bars, log lines) belongs to the sink.

use std::time::Duration;

use crate::catalogue::DownloadDescriptor;
use crate::outcome::TransferOutcome;

pub trait ProgressSink {
    fn on_start(&mut self, total: usize);
    /// Called exactly once per descriptor, for terminal outcomes only.
    fn on_step(&mut self, descriptor: &DownloadDescriptor, outcome: &TransferOutcome);
    fn on_finish(&mut self, _summary: &BatchSummary) {}
}

/// Sink that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_start(&mut self, _total: usize) {}
    fn on_step(&mut self, _descriptor: &DownloadDescriptor, _outcome: &TransferOutcome) {}
}

/// Sink that writes one tracing line per step.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
    done: usize,
}

impl ProgressSink for LogProgress {
    fn on_start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        tracing::info!(total, "batch started");
    }

    fn on_step(&mut self, descriptor: &DownloadDescriptor, outcome: &TransferOutcome) {
        self.done += 1;
        tracing::info!("[{}/{}] {}: {}", self.done, self.total, descriptor, outcome);
    }

    fn on_finish(&mut self, summary: &BatchSummary) {
        tracing::info!(
            completed = summary.completed,
            skipped = summary.skipped,
            exhausted = summary.exhausted,
            cancelled = summary.cancelled,
            bytes = summary.bytes_written,
            "batch finished"
        );
    }
}

/// A descriptor that ran out of attempts.
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub descriptor: DownloadDescriptor,
    pub attempts: u32,
    pub error: String,
}

/// Totals of a finished batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub exhausted: usize,
    pub cancelled: usize,
    /// Body bytes written by completed transfers.
    pub bytes_written: u64,
    pub failures: Vec<FailedItem>,
    /// Highest number of attempts that ran at the same time.
    pub peak_concurrency: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, descriptor: &DownloadDescriptor, outcome: &TransferOutcome) {
        match outcome {
            TransferOutcome::Completed { bytes } => {
                self.completed += 1;
                self.bytes_written += bytes;
            }
            TransferOutcome::Skipped(_) => self.skipped += 1,
            TransferOutcome::ExhaustedRetries { error, attempts } => {
                self.exhausted += 1;
                self.failures.push(FailedItem {
                    descriptor: descriptor.clone(),
                    attempts: *attempts,
                    error: error.to_string(),
                });
            }
            TransferOutcome::Cancelled => self.cancelled += 1,
            TransferOutcome::Failed { .. } => {
                tracing::error!(descriptor = %descriptor, "non-terminal outcome reported as terminal");
            }
        }
    }

    /// Descriptors that reached a terminal outcome.
    pub fn finished(&self) -> usize {
        self.completed + self.skipped + self.exhausted + self.cancelled
    }

    /// True when nothing failed and nothing was cancelled.
    pub fn is_clean(&self) -> bool {
        self.exhausted == 0 && self.cancelled == 0
    }

    /// Average write rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_written as f64 / secs
    }
}
