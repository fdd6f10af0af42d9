use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Observer for run progress, e.g. a terminal progress bar.
pub trait ProgressSink: Send + Sync {
    fn on_total(&self, total: usize);
    fn on_progress(&self);
}

/// Shared processed/total counters for one run.
///
/// Readers get `processed()` and `total()`; only the pipeline mutates.
#[derive(Default)]
pub struct ProgressTracker {
    processed: AtomicUsize,
    total: AtomicUsize,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl ProgressTracker {
    pub fn new(sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            sink,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        if let Some(sink) = &self.sink {
            sink.on_total(total);
        }
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if let Some(sink) = &self.sink {
            sink.on_progress();
        }
    }
}

/// Drives an indicatif bar from progress callbacks.
pub struct BarSink {
    bar: indicatif::ProgressBar,
}

impl BarSink {
    pub fn new() -> anyhow::Result<Self> {
        let bar = indicatif::ProgressBar::new(0);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ancestors ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarSink {
    fn on_total(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_progress(&self) {
        self.bar.inc(1);
    }
}
