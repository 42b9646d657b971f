//! `zipfetch fetch <year>` – download one year's archives.

use anyhow::Result;
use zipfetch_core::catalogue::{load_catalogue, select_year};
use zipfetch_core::config::FetchConfig;
use zipfetch_core::retry::RetryScheduler;
use zipfetch_core::storage::ensure_destination_dir;
use zipfetch_core::{BatchSummary, CancelToken, CurlTransfer, DownloadManager, FetchError};

use crate::cli::progress_bar::BarProgress;

pub async fn run_fetch(cfg: FetchConfig, year: &str) -> Result<()> {
    let catalogue = load_catalogue(&cfg.catalogue_path)?;
    let selected = select_year(&catalogue, year)?;
    ensure_destination_dir(&cfg.destination_dir).map_err(|source| FetchError::DestinationDir {
        path: cfg.destination_dir.clone(),
        source,
    })?;
    tracing::info!(
        year,
        archives = selected.len(),
        dest = %cfg.destination_dir.display(),
        concurrency = cfg.concurrency,
        "fetching"
    );

    let cancel = CancelToken::new();
    let manager = DownloadManager::new(CurlTransfer::new(cfg.transfer_settings()), cfg.concurrency)
        .with_scheduler(RetryScheduler::new(cfg.retry_policy()))
        .with_cancel_token(cancel.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling batch");
            eprintln!("Interrupted, finishing up...");
            cancel.cancel();
        }
    });

    let summary = tokio::task::spawn_blocking(move || {
        let mut bar = BarProgress::new();
        manager.run(selected, &mut bar)
    })
    .await
    .map_err(|e| anyhow::anyhow!("batch task join: {}", e))?;
    interrupt.abort();

    for line in summary_lines(&summary) {
        println!("{}", line);
    }
    if summary.cancelled > 0 {
        anyhow::bail!("cancelled with {} archive(s) not fetched", summary.cancelled);
    }
    Ok(())
}

pub(crate) fn summary_lines(summary: &BatchSummary) -> Vec<String> {
    let mib = summary.bytes_written as f64 / 1_048_576.0;
    let rate_mib = summary.bytes_per_sec() / 1_048_576.0;
    let mut lines = vec![format!(
        "{} archive(s): {} downloaded, {} skipped, {} failed, {} cancelled. {:.1} MiB in {:.1}s ({:.2} MiB/s)",
        summary.total,
        summary.completed,
        summary.skipped,
        summary.exhausted,
        summary.cancelled,
        mib,
        summary.elapsed.as_secs_f64(),
        rate_mib
    )];
    for f in &summary.failures {
        if f.attempts == 0 {
            lines.push(format!("  rejected: {}: {}", f.descriptor, f.error));
            continue;
        }
        lines.push(format!(
            "  failed: {} after {} attempt(s): {} ({})",
            f.descriptor, f.attempts, f.error, f.descriptor.source_url
        ));
    }
    lines
}
