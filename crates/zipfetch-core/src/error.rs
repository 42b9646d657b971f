//! Setup-phase errors. These abort a run before any transfer starts.

use std::path::PathBuf;

use crate::catalogue::CatalogueError;

/// Fatal errors: bad input or an unusable destination. Per-file transfer
/// failures never surface here; they end as `TransferOutcome::ExhaustedRetries`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The catalogue has no entries for the requested year.
    #[error("no datasets found for year {year}")]
    NotFoundInput { year: String },

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error("cannot create destination directory {}: {source}", path.display())]
    DestinationDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
