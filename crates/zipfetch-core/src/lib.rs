pub mod config;
pub mod logging;

pub mod catalogue;
pub mod control;
pub mod controller;
pub mod error;
pub mod http;
pub mod local_probe;
pub mod outcome;
pub mod progress;
pub mod remote_probe;
pub mod retry;
pub mod storage;
pub mod task;
pub mod transfer;

pub use catalogue::DownloadDescriptor;
pub use control::CancelToken;
pub use controller::DownloadManager;
pub use error::FetchError;
pub use outcome::{SkipReason, TransferOutcome};
pub use progress::{BatchSummary, ProgressSink};
pub use transfer::{CurlTransfer, TransferExecutor, TransferSettings};
