//! CLI for the zipfetch archive downloader.

mod commands;
mod progress_bar;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use zipfetch_core::config::{self, FetchConfig, RetryConfig};
use zipfetch_core::transfer::SkipPolicy;

use commands::{run_config, run_fetch, run_list};

/// Top-level CLI for zipfetch.
#[derive(Debug, Parser)]
#[command(name = "zipfetch")]
#[command(about = "zipfetch: bulk archive downloader with bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every archive of one year from the catalogue.
    Fetch {
        /// Year to fetch (e.g. 2020).
        year: String,

        #[command(flatten)]
        opts: FetchArgs,
    },

    /// List catalogue years with counts, or the archives of one year.
    List {
        /// Show the archives of this year instead of the year summary.
        year: Option<String>,

        /// Catalogue file (overrides config).
        #[arg(long, value_name = "FILE")]
        catalogue: Option<PathBuf>,
    },

    /// Show the config file location and effective values.
    Config,
}

/// Per-run overrides of config.toml.
#[derive(Debug, Default, Clone, Args)]
pub struct FetchArgs {
    /// Maximum simultaneous downloads.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Destination directory for archives.
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Catalogue file.
    #[arg(long, value_name = "FILE")]
    pub catalogue: Option<PathBuf>,

    /// Download even when the local file matches the remote size.
    #[arg(long)]
    pub force_refresh: bool,

    /// Treat any existing local file as done, without asking the server.
    #[arg(long, conflicts_with = "force_refresh")]
    pub skip_existing: bool,

    /// Attempts per archive, including the first.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,
}

impl FetchArgs {
    /// Overlays the flags that were given onto `cfg`.
    pub fn apply(&self, cfg: &mut FetchConfig) {
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        if let Some(dir) = &self.dest {
            cfg.destination_dir = dir.clone();
        }
        if let Some(path) = &self.catalogue {
            cfg.catalogue_path = path.clone();
        }
        if self.force_refresh {
            cfg.force_refresh = true;
        }
        if self.skip_existing {
            cfg.skip_policy = SkipPolicy::Exists;
        }
        if let Some(n) = self.max_attempts {
            cfg.retry.get_or_insert_with(RetryConfig::default).max_attempts = n;
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { year, opts } => {
                opts.apply(&mut cfg);
                run_fetch(cfg, &year).await?;
            }
            CliCommand::List { year, catalogue } => {
                if let Some(path) = catalogue {
                    cfg.catalogue_path = path;
                }
                run_list(&cfg, year.as_deref())?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
