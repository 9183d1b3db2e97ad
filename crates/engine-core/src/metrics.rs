use chrono::Utc;
use model::execution::{outcome::BatchOutcome, result::PurgeResult};
use serde::Serialize;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

#[derive(Debug)]
struct Timer {
    count: AtomicU64,
    total_us: AtomicU64,
    min_us: AtomicU64,
    max_us: AtomicU64,
}

impl Default for Timer {
    fn default() -> Self {
        Timer {
            count: AtomicU64::new(0),
            total_us: AtomicU64::new(0),
            min_us: AtomicU64::new(u64::MAX),
            max_us: AtomicU64::new(0),
        }
    }
}

impl Timer {
    fn record(&self, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_us.fetch_add(us, Ordering::Relaxed);
        self.min_us.fetch_min(us, Ordering::Relaxed);
        self.max_us.fetch_max(us, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TimerSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        TimerSnapshot {
            count,
            total_us: self.total_us.load(Ordering::Relaxed),
            min_us: if count == 0 {
                0
            } else {
                self.min_us.load(Ordering::Relaxed)
            },
            max_us: self.max_us.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    pub total_us: u64,
    pub min_us: u64,
    pub max_us: u64,
}

impl TimerSnapshot {
    pub fn mean_us(&self) -> u64 {
        self.total_us.checked_div(self.count).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct InnerMetrics {
    pages: AtomicU64,
    page_errors: AtomicU64,
    partitions: AtomicU64,
    rows: AtomicU64,
    batches: AtomicU64,
    batch_errors: AtomicU64,
    row_errors: AtomicU64,
    page_timer: Timer,
    batch_timer: Timer,
    frozen: OnceLock<PurgeResult>,
}

/// Run-wide counters shared by every stage of every sub-period pipeline.
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub pages: u64,
    pub page_errors: u64,
    pub partitions: u64,
    pub rows: u64,
    pub batches: u64,
    pub batch_errors: u64,
    pub row_errors: u64,
    pub page_duration: TimerSnapshot,
    pub batch_duration: TimerSnapshot,
}

impl MetricsSnapshot {
    pub fn apply_to(&self, result: &mut PurgeResult) {
        result.page_count = self.pages;
        result.page_error_count = self.page_errors;
        result.partition_count = self.partitions;
        result.row_count = self.rows;
        result.batch_count = self.batches;
        result.batch_error_count = self.batch_errors;
        result.row_error_count = self.row_errors;
    }
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    /// Records a fetched page and returns the number of pages seen so far.
    pub fn record_page(&self, elapsed: Duration) -> u64 {
        self.inner.page_timer.record(elapsed);
        self.inner.pages.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_page_failure(&self, elapsed: Duration) {
        self.inner.page_timer.record(elapsed);
        self.inner.page_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_partitions(&self, count: u64) {
        self.inner.partitions.fetch_add(count, Ordering::Relaxed);
    }

    /// Counts an executed chunk. Failed chunks still count towards rows and
    /// batches.
    pub fn record_outcome(&self, outcome: &BatchOutcome) {
        let rows = outcome.chunk_size as u64;
        self.inner.batches.fetch_add(1, Ordering::Relaxed);
        self.inner.rows.fetch_add(rows, Ordering::Relaxed);
        self.inner.batch_timer.record(outcome.duration);

        if !outcome.is_success() {
            self.inner.batch_errors.fetch_add(1, Ordering::Relaxed);
            self.inner.row_errors.fetch_add(rows, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages: self.inner.pages.load(Ordering::Relaxed),
            page_errors: self.inner.page_errors.load(Ordering::Relaxed),
            partitions: self.inner.partitions.load(Ordering::Relaxed),
            rows: self.inner.rows.load(Ordering::Relaxed),
            batches: self.inner.batches.load(Ordering::Relaxed),
            batch_errors: self.inner.batch_errors.load(Ordering::Relaxed),
            row_errors: self.inner.row_errors.load(Ordering::Relaxed),
            page_duration: self.inner.page_timer.snapshot(),
            batch_duration: self.inner.batch_timer.snapshot(),
        }
    }

    /// Copies the current totals into `base`, stamps its end time and keeps
    /// it as the final result. Only the first call has any effect; later
    /// calls return the result frozen by the first.
    pub fn freeze(&self, base: PurgeResult) -> PurgeResult {
        self.inner
            .frozen
            .get_or_init(|| {
                let mut result = base;
                self.snapshot().apply_to(&mut result);
                result.end_time = Utc::now();
                result
            })
            .clone()
    }

    pub fn frozen(&self) -> Option<&PurgeResult> {
        self.inner.frozen.get()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
