//! Retry boundary around a single transfer attempt.

use super::classify::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::outcome::TransferOutcome;
use crate::task::Task;

/// What the controller does with a task after its attempt returned.
#[derive(Debug)]
pub enum Next {
    /// Put this task at the back of the queue. No progress event yet.
    Requeue(Task),
    /// Report this terminal outcome.
    Done(TransferOutcome),
}

/// Turns `Failed` outcomes into a re-enqueued task or `ExhaustedRetries`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryScheduler {
    policy: RetryPolicy,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn after_attempt(&self, task: Task, outcome: TransferOutcome) -> Next {
        let error = match outcome {
            TransferOutcome::Failed { error, .. } => error,
            terminal => return Next::Done(terminal),
        };
        let kind = classify(&error);
        let attempts_made = task.attempt + 1;
        match self.policy.decide(attempts_made, kind) {
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    descriptor = %task.descriptor,
                    attempt = attempts_made,
                    max_attempts = self.policy.max_attempts,
                    ?kind,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, re-enqueueing"
                );
                Next::Requeue(task.retry_after(delay))
            }
            RetryDecision::NoRetry => {
                tracing::error!(
                    descriptor = %task.descriptor,
                    url = %task.descriptor.source_url,
                    attempts = attempts_made,
                    error = %error,
                    "giving up after {} attempts",
                    attempts_made
                );
                Next::Done(TransferOutcome::ExhaustedRetries {
                    error,
                    attempts: attempts_made,
                })
            }
        }
    }
}
