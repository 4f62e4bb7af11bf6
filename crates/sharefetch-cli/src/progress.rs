//! Terminal progress bars: one bar per transfer in a shared `MultiProgress`.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use sharefetch_core::ProgressObserver;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

pub struct BarProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
    sized: ProgressStyle,
    spinner: ProgressStyle,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(draw_target: ProgressDrawTarget) -> Self {
        let sized = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        let spinner = ProgressStyle::with_template("{spinner} {msg} {bytes} {bytes_per_sec}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        Self {
            multi: MultiProgress::with_draw_target(draw_target),
            bars: Mutex::new(HashMap::new()),
            sized,
            spinner,
        }
    }

    fn bar(&self, url: &str) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    fn take(&self, url: &str) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, url: &str, path: &Path, total: Option<u64>) {
        let bar = match total {
            Some(len) => ProgressBar::new(len).with_style(self.sized.clone()),
            None => ProgressBar::new_spinner().with_style(self.spinner.clone()),
        };
        let bar = self.multi.add(bar);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        bar.set_message(name);
        let previous = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), bar);
        // The same URL listed twice reuses its key; retire the older bar.
        if let Some(old) = previous {
            old.finish_and_clear();
        }
    }

    fn on_progress(&self, url: &str, bytes_done: u64) {
        if let Some(bar) = self.bar(url) {
            bar.set_position(bytes_done);
        }
    }

    fn on_finish(&self, url: &str) {
        if let Some(bar) = self.take(url) {
            bar.finish();
        }
    }

    fn on_fail(&self, url: &str) {
        if let Some(bar) = self.take(url) {
            bar.finish_and_clear();
        }
    }
}
