//! Retry and backoff policy.
//!
//! Error classification (timeouts, throttling, connection failures), capped
//! exponential backoff, and the scheduler step that decides whether a failed
//! attempt goes back on the queue or ends as `ExhaustedRetries`.

mod classify;
mod error;
mod policy;
mod scheduler;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use scheduler::{Next, RetryScheduler};
