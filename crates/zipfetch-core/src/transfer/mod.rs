//! Transfer executor: one attempt for one descriptor.
//!
//! Decides skip vs download from local and remote state, then streams the body
//! to disk. No retry happens here; a failure comes back as
//! `TransferOutcome::Failed` for the retry scheduler.

mod download;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalogue::DownloadDescriptor;
use crate::control::CancelToken;
use crate::http::CurlOptions;
use crate::local_probe::{self, LocalState};
use crate::outcome::{SkipReason, TransferOutcome};
use crate::remote_probe::{self, RemoteInfo};

use download::{fetch_to, Fetched};

/// When an existing local file counts as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Skip only when the local size equals the size the remote declares.
    #[default]
    SizeMatch,
    /// Skip whenever a file with that name exists, without contacting the remote.
    Exists,
}

/// Everything one attempt needs besides the descriptor.
#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub destination_dir: PathBuf,
    /// Download even when the local file looks complete.
    pub force_refresh: bool,
    pub skip_policy: SkipPolicy,
    pub curl: CurlOptions,
}

impl TransferSettings {
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            force_refresh: false,
            skip_policy: SkipPolicy::default(),
            curl: CurlOptions::default(),
        }
    }
}

/// Runs a single attempt. Must be callable from several worker threads at once
/// for distinct descriptors.
pub trait TransferExecutor: Sync {
    fn attempt(
        &self,
        descriptor: &DownloadDescriptor,
        attempt: u32,
        cancel: &CancelToken,
    ) -> TransferOutcome;
}

/// The libcurl-backed executor.
#[derive(Debug, Clone)]
pub struct CurlTransfer {
    settings: TransferSettings,
}

impl CurlTransfer {
    pub fn new(settings: TransferSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Returns the skip outcome if the local file can be kept, `None` if the
    /// body must be downloaded.
    fn check_existing(
        &self,
        descriptor: &DownloadDescriptor,
        local_size: u64,
        attempt: u32,
        cancel: &CancelToken,
    ) -> Option<TransferOutcome> {
        match self.settings.skip_policy {
            SkipPolicy::Exists => Some(TransferOutcome::Skipped(SkipReason::AlreadyPresent)),
            SkipPolicy::SizeMatch => {
                match remote_probe::probe(&descriptor.source_url, &self.settings.curl, cancel) {
                    Ok(RemoteInfo { size: Some(remote) }) if remote == local_size => {
                        Some(TransferOutcome::Skipped(SkipReason::AlreadyUpToDate))
                    }
                    Ok(RemoteInfo { size }) => {
                        tracing::debug!(
                            descriptor = %descriptor,
                            local_size,
                            remote_size = ?size,
                            "local file differs from remote, downloading again"
                        );
                        None
                    }
                    Err(_) if cancel.is_cancelled() => Some(TransferOutcome::Cancelled),
                    Err(error) => Some(TransferOutcome::Failed { error, attempt }),
                }
            }
        }
    }
}

impl TransferExecutor for CurlTransfer {
    fn attempt(
        &self,
        descriptor: &DownloadDescriptor,
        attempt: u32,
        cancel: &CancelToken,
    ) -> TransferOutcome {
        if cancel.is_cancelled() {
            return TransferOutcome::Cancelled;
        }
        let final_path = descriptor.target_path(&self.settings.destination_dir);

        if !self.settings.force_refresh {
            if let LocalState::Present(local_size) = local_probe::probe(&final_path) {
                if let Some(outcome) = self.check_existing(descriptor, local_size, attempt, cancel) {
                    return outcome;
                }
            }
        }

        tracing::debug!(descriptor = %descriptor, attempt = attempt + 1, "downloading");
        match fetch_to(&descriptor.source_url, &final_path, &self.settings.curl, cancel) {
            Ok(Fetched::Complete { bytes }) => TransferOutcome::Completed { bytes },
            Ok(Fetched::Cancelled) => TransferOutcome::Cancelled,
            Err(error) => TransferOutcome::Failed { error, attempt },
        }
    }
}
