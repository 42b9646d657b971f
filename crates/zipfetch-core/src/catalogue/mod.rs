//! Download descriptors and the JSON catalogue they are loaded from.
//!
//! The catalogue is produced by a separate enumeration step as a JSON array of
//! `{org, title, year, zip_name, zip_url}` objects. This module only reads it,
//! selects one year, and validates the selection before the batch starts.

mod sanitize;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::storage::TEMP_SUFFIX;

pub use sanitize::sanitize_file_name;

/// One remote archive to fetch. Identified by `(group, year, file_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    #[serde(alias = "org")]
    pub group: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(alias = "zip_name", alias = "fileName")]
    pub file_name: String,
    #[serde(alias = "zip_url", alias = "sourceURL")]
    pub source_url: String,
}

impl DownloadDescriptor {
    pub fn new(
        group: impl Into<String>,
        year: impl Into<String>,
        file_name: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            year: year.into(),
            title: None,
            file_name: file_name.into(),
            source_url: source_url.into(),
        }
    }

    /// Unique key of this descriptor within a batch.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.group, &self.year, &self.file_name)
    }

    /// Local file name: `file_name` reduced to a single safe path component.
    pub fn local_name(&self) -> String {
        sanitize_file_name(&self.file_name)
    }

    /// Final path of this descriptor under `destination_dir`.
    pub fn target_path(&self, destination_dir: &Path) -> PathBuf {
        destination_dir.join(self.local_name())
    }
}

impl fmt::Display for DownloadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.year, self.file_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalogue is not a valid descriptor list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalogue entry {descriptor}: {reason}")]
    InvalidEntry { descriptor: String, reason: String },
}

/// Reads and parses the catalogue file. Entries are not validated here; see
/// [`select_year`].
pub fn load_catalogue(path: &Path) -> Result<Vec<DownloadDescriptor>, CatalogueError> {
    let data = std::fs::read_to_string(path).map_err(|source| CatalogueError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_catalogue(&data)?;
    tracing::debug!(path = %path.display(), entries = list.len(), "catalogue loaded");
    Ok(list)
}

pub fn parse_catalogue(data: &str) -> Result<Vec<DownloadDescriptor>, CatalogueError> {
    Ok(serde_json::from_str(data)?)
}

/// Selects the entries for `year` in catalogue order and validates them.
///
/// Returns `FetchError::NotFoundInput` when nothing matches, so the caller can
/// abort before any transfer starts.
pub fn select_year(
    catalogue: &[DownloadDescriptor],
    year: &str,
) -> Result<Vec<DownloadDescriptor>, FetchError> {
    let selected: Vec<DownloadDescriptor> = catalogue
        .iter()
        .filter(|d| d.year == year)
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(FetchError::NotFoundInput {
            year: year.to_string(),
        });
    }
    for d in &selected {
        validate(d)?;
    }
    Ok(selected)
}

/// Rejects entries that cannot be fetched: non-HTTP URLs or file names that
/// sanitize to nothing.
pub fn validate(d: &DownloadDescriptor) -> Result<(), CatalogueError> {
    let invalid = |reason: String| CatalogueError::InvalidEntry {
        descriptor: d.to_string(),
        reason,
    };
    if d.local_name().is_empty() {
        return Err(invalid(format!("unusable file name {:?}", d.file_name)));
    }
    let url = url::Url::parse(&d.source_url)
        .map_err(|e| invalid(format!("bad URL {:?}: {}", d.source_url, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported URL scheme {:?}", url.scheme())));
    }
    Ok(())
}

/// Why an entry cannot run in the same batch as an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Same `(group, year, file_name)` as an earlier entry.
    DuplicateKey,
    /// Its local file or `.part` file is a path an earlier entry writes.
    LocalName { name: String, owner: String },
}

/// Result of [`dedup_descriptors`]: entries that can run, in input order,
/// and the ones held back with the reason.
#[derive(Debug, Default)]
pub struct Deduped {
    pub unique: Vec<DownloadDescriptor>,
    pub conflicts: Vec<(DownloadDescriptor, Conflict)>,
}

/// Splits off repeated keys and entries whose local path (final or `.part`)
/// overlaps an earlier entry's. The first entry wins; two entries on one path
/// would otherwise race.
pub fn dedup_descriptors(list: Vec<DownloadDescriptor>) -> Deduped {
    let mut seen_keys = HashSet::new();
    // Every path a kept entry writes, mapped to that entry.
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut out = Deduped::default();
    for d in list {
        let key = (d.group.clone(), d.year.clone(), d.file_name.clone());
        if seen_keys.contains(&key) {
            tracing::warn!(descriptor = %d, "duplicate catalogue entry held back");
            out.conflicts.push((d, Conflict::DuplicateKey));
            continue;
        }
        let name = d.local_name();
        let temp = format!("{}{}", name, TEMP_SUFFIX);
        if let Some(owner) = claimed.get(&name).or_else(|| claimed.get(&temp)) {
            let owner = owner.clone();
            tracing::warn!(descriptor = %d, name = %name, owner = %owner, "local file name already used");
            out.conflicts.push((d, Conflict::LocalName { name, owner }));
            continue;
        }
        seen_keys.insert(key);
        let owner = d.to_string();
        claimed.insert(name, owner.clone());
        claimed.insert(temp, owner);
        out.unique.push(d);
    }
    out
}

/// Number of entries per year, sorted by year.
pub fn year_counts(catalogue: &[DownloadDescriptor]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for d in catalogue {
        *counts.entry(d.year.as_str()).or_insert(0) += 1;
    }
    counts
}
