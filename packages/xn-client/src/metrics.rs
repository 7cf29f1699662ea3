//! Process-local counters (lock-free atomics), logged when the CLI exits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Queries ---
    pub queries_total: AtomicU64,
    pub query_errors: AtomicU64,

    // --- Transactions ---
    pub tx_total: AtomicU64,
    pub tx_success: AtomicU64,
    pub tx_error: AtomicU64,
    pub broadcast_retries: AtomicU64,
    pub status_polls: AtomicU64,

    // --- Latency (ms) ---
    pub tx_duration_ms_sum: AtomicU64,
    pub tx_duration_ms_max: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            queries_total: AtomicU64::new(0),
            query_errors: AtomicU64::new(0),
            tx_total: AtomicU64::new(0),
            tx_success: AtomicU64::new(0),
            tx_error: AtomicU64::new(0),
            broadcast_retries: AtomicU64::new(0),
            status_polls: AtomicU64::new(0),
            tx_duration_ms_sum: AtomicU64::new(0),
            tx_duration_ms_max: AtomicU64::new(0),
        }
    }

    pub fn record_tx_duration(&self, start: Instant) {
        let ms = start.elapsed().as_millis() as u64;
        self.tx_duration_ms_sum.fetch_add(ms, Ordering::Relaxed);
        self.tx_duration_ms_max.fetch_max(ms, Ordering::Relaxed);
    }

    pub fn log_summary(&self) {
        info!(
            queries = self.queries_total.load(Ordering::Relaxed),
            query_errors = self.query_errors.load(Ordering::Relaxed),
            tx_total = self.tx_total.load(Ordering::Relaxed),
            tx_success = self.tx_success.load(Ordering::Relaxed),
            tx_error = self.tx_error.load(Ordering::Relaxed),
            broadcast_retries = self.broadcast_retries.load(Ordering::Relaxed),
            status_polls = self.status_polls.load(Ordering::Relaxed),
            tx_ms_sum = self.tx_duration_ms_sum.load(Ordering::Relaxed),
            tx_ms_max = self.tx_duration_ms_max.load(Ordering::Relaxed),
            "Session metrics"
        );
    }
}
