//! Result of one attempt, and the terminal outcomes reported to the progress sink.

use std::fmt;

use crate::retry::TransferError;

/// Why a descriptor was not downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A file with that name exists and the skip policy does not compare sizes.
    AlreadyPresent,
    /// Local size equals the size the remote declares.
    AlreadyUpToDate,
    /// Same key as an earlier entry of the batch; that entry does the work.
    Duplicate,
}

/// Outcome of a transfer attempt.
///
/// `Failed` only ever comes out of a single attempt; the retry scheduler turns
/// it into either a re-enqueued task or `ExhaustedRetries`. Every other variant
/// is terminal and reported exactly once per descriptor.
#[derive(Debug)]
pub enum TransferOutcome {
    Completed { bytes: u64 },
    Skipped(SkipReason),
    Failed { error: TransferError, attempt: u32 },
    ExhaustedRetries { error: TransferError, attempts: u32 },
    /// The batch was cancelled before or during this descriptor's transfer.
    Cancelled,
}

impl TransferOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferOutcome::Failed { .. })
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Completed { bytes } => write!(f, "completed ({} bytes)", bytes),
            TransferOutcome::Skipped(SkipReason::AlreadyPresent) => write!(f, "skipped (present)"),
            TransferOutcome::Skipped(SkipReason::AlreadyUpToDate) => {
                write!(f, "skipped (up to date)")
            }
            TransferOutcome::Skipped(SkipReason::Duplicate) => {
                write!(f, "skipped (duplicate entry)")
            }
            TransferOutcome::Failed { error, attempt } => {
                write!(f, "failed on attempt {}: {}", attempt + 1, error)
            }
            TransferOutcome::ExhaustedRetries { error, attempts: 0 } => {
                write!(f, "rejected: {}", error)
            }
            TransferOutcome::ExhaustedRetries { error, attempts } => {
                write!(f, "gave up after {} attempts: {}", attempts, error)
            }
            TransferOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}
