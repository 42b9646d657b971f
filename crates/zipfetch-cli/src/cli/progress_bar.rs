//! Terminal progress bar for a batch: one tick per archive.

use indicatif::{ProgressBar, ProgressStyle};
use zipfetch_core::{BatchSummary, DownloadDescriptor, ProgressSink, TransferOutcome};

const TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn on_start(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━━╌"),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        self.bar = bar;
    }

    fn on_step(&mut self, descriptor: &DownloadDescriptor, outcome: &TransferOutcome) {
        if let TransferOutcome::ExhaustedRetries { .. } = outcome {
            self.bar.println(format!("failed: {}: {}", descriptor, outcome));
        }
        self.bar.set_message(descriptor.file_name.clone());
        self.bar.inc(1);
    }

    fn on_finish(&mut self, _summary: &BatchSummary) {
        self.bar.finish_and_clear();
    }
}
