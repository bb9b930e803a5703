use std::sync::Mutex;

/// Counters for the visualization pipeline and the assistant exchanges.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub projections: usize,
    pub exchanges_completed: usize,
    pub exchanges_failed: usize,
    pub replies_discarded: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_projection(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.projections += 1;
        }
    }

    pub fn record_exchange_completed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.exchanges_completed += 1;
        }
    }

    pub fn record_exchange_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.exchanges_failed += 1;
        }
    }

    pub fn record_reply_discarded(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.replies_discarded += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
