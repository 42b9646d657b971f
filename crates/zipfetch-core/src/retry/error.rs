//! Error of a single transfer attempt, classified for retry decisions.

/// Why one attempt for one descriptor failed. Every variant is retried until
/// the attempt budget runs out.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection reset, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The body ended before the declared `Content-Length`.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Writing, syncing or renaming the local file failed (e.g. disk full).
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// Another entry of the batch already writes this local file. Never attempted.
    #[error("local file {name} is already written by {owner}")]
    NameCollision { name: String, owner: String },
}

impl TransferError {
    /// True for failures that happened while the body was being written
    /// (the "stream" class); false for request-level failures.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            TransferError::PartialTransfer { .. } | TransferError::Storage(_)
        )
    }
}
