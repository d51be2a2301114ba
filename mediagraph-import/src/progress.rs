//! Import progress reporting.
//!
//! A run reports through an [`ImportProgress`] sink. Sinks only observe;
//! nothing they do changes the outcome of a run.

use mediagraph_catalog::EntityKind;

pub trait ImportProgress {
    /// Before each instance of `kind`; `current` counts from 1.
    fn on_item(&self, kind: EntityKind, current: usize, total: usize, key: &str);

    /// A type pass starts or ends, e.g. `[studios] importing`.
    fn on_phase(&self, message: &str);

    /// The run finished; `message` summarises failures and warnings.
    fn on_complete(&self, message: &str);
}

pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_item(&self, _: EntityKind, _: usize, _: usize, _: &str) {}
    fn on_phase(&self, _: &str) {}
    fn on_complete(&self, _: &str) {}
}

/// Writes progress through the `log` facade, one item line every
/// `interval` instances plus the last one of each type.
pub struct LogProgress {
    interval: usize,
}

impl LogProgress {
    pub fn every(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    fn should_log(&self, current: usize, total: usize) -> bool {
        current == total || current.is_multiple_of(self.interval)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::every(100)
    }
}

impl ImportProgress for LogProgress {
    fn on_item(&self, kind: EntityKind, current: usize, total: usize, key: &str) {
        if self.should_log(current, total) {
            log::info!("[{kind}] {current}/{total} {key}");
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{message}");
    }

    fn on_complete(&self, message: &str) {
        log::info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_throttles_items() {
        let progress = LogProgress::every(10);
        let logged: Vec<_> = (1..=25).filter(|&i| progress.should_log(i, 25)).collect();
        assert_eq!(logged, vec![10, 20, 25]);
    }

    #[test]
    fn zero_interval_logs_everything() {
        let progress = LogProgress::every(0);
        assert!((1..=3).all(|i| progress.should_log(i, 3)));
    }
}
