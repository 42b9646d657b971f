use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::DEFAULT_CONCURRENCY;
use crate::http::CurlOptions;
use crate::retry::RetryPolicy;
use crate::transfer::{SkipPolicy, TransferSettings};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per archive (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_secs: policy.base_delay.as_secs_f64(),
            max_delay_secs: policy.max_delay.as_secs(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let max_delay = Duration::from_secs(self.max_delay_secs);
        // Negative or NaN delays become zero; too large for a Duration, the cap.
        let base = match Duration::try_from_secs_f64(self.base_delay_secs) {
            Ok(d) => d,
            Err(_) if self.base_delay_secs > 0.0 => max_delay,
            Err(_) => Duration::ZERO,
        };
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: base,
            max_delay,
        }
    }
}

/// Global configuration loaded from `~/.config/zipfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of archives transferring at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Where archives are written.
    #[serde(default = "default_destination_dir")]
    pub destination_dir: PathBuf,
    /// JSON catalogue of archives.
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: PathBuf,
    /// Re-download even when the local file looks complete.
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub skip_policy: SkipPolicy,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_destination_dir() -> PathBuf {
    PathBuf::from("zips")
}

fn default_catalogue_path() -> PathBuf {
    PathBuf::from("out_list.json")
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            destination_dir: default_destination_dir(),
            catalogue_path: default_catalogue_path(),
            force_refresh: false,
            skip_policy: SkipPolicy::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: None,
            retry: None,
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn curl_options(&self) -> CurlOptions {
        let mut opts = CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..CurlOptions::default()
        };
        if let Some(ua) = &self.user_agent {
            opts.user_agent = ua.clone();
        }
        opts
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            destination_dir: self.destination_dir.clone(),
            force_refresh: self.force_refresh,
            skip_policy: self.skip_policy,
            curl: self.curl_options(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zipfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = render(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// The config as it would be written to config.toml.
pub fn render(cfg: &FetchConfig) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
