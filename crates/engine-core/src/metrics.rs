use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    mode_switch_requests: AtomicU64,
    mode_switch_failures: AtomicU64,
    ticks: AtomicU64,
    rows_written: AtomicU64,
    bytes_written: AtomicU64,
}

/// Counters shared between the foreground import and the background mode ticker.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub mode_switch_requests: u64,
    pub mode_switch_failures: u64,
    pub ticks: u64,
    pub rows_written: u64,
    pub bytes_written: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_switch_requests(&self, count: u64) {
        self.inner
            .mode_switch_requests
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_switch_failures(&self, count: u64) {
        self.inner
            .mode_switch_failures
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_ticks(&self, count: u64) {
        self.inner.ticks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_rows(&self, count: u64) {
        self.inner.rows_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_bytes(&self, count: u64) {
        self.inner.bytes_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            mode_switch_requests: self.inner.mode_switch_requests.load(Ordering::Relaxed),
            mode_switch_failures: self.inner.mode_switch_failures.load(Ordering::Relaxed),
            ticks: self.inner.ticks.load(Ordering::Relaxed),
            rows_written: self.inner.rows_written.load(Ordering::Relaxed),
            bytes_written: self.inner.bytes_written.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
