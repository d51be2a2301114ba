//! Terminal progress bar for import runs.

use indicatif::{ProgressBar, ProgressStyle};

use mediagraph_catalog::EntityKind;
use mediagraph_import::ImportProgress;

/// Shows one bar per entity type, reset at every phase.
pub(crate) struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("  {spinner:.cyan} {prefix:>14} [{bar:30}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=> ").tick_chars("/-\\|"));
        }
        Self { pb }
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}

impl ImportProgress for BarProgress {
    fn on_item(&self, kind: EntityKind, current: usize, total: usize, key: &str) {
        if current == 1 {
            self.pb.set_prefix(kind.to_string());
            self.pb.set_length(total as u64);
        }
        self.pb.set_position(current as u64);
        self.pb.set_message(key.to_string());
    }

    fn on_phase(&self, message: &str) {
        self.pb.reset();
        self.pb.set_length(0);
        self.pb.set_message(message.to_string());
        log::debug!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        self.pb.finish_and_clear();
        log::info!("{}", message);
    }
}
