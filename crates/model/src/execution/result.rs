use crate::core::identifiers::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a purge run. This is the only state handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeResult {
    pub run_id: RunId,
    pub page_count: u64,
    pub page_error_count: u64,
    pub partition_count: u64,
    pub row_count: u64,
    pub batch_count: u64,
    pub batch_error_count: u64,
    pub row_error_count: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Lower bound of the purged window, when one was computed.
    pub min_date: Option<DateTime<Utc>>,
    /// Exclusive upper bound of the purged window.
    pub max_date: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub cancelled: bool,
}

impl PurgeResult {
    /// A result with no work recorded, ended at `start_time`.
    pub fn started(run_id: RunId, start_time: DateTime<Utc>, dry_run: bool) -> Self {
        PurgeResult {
            run_id,
            page_count: 0,
            page_error_count: 0,
            partition_count: 0,
            row_count: 0,
            batch_count: 0,
            batch_error_count: 0,
            row_error_count: 0,
            start_time,
            end_time: start_time,
            min_date: None,
            max_date: None,
            dry_run,
            cancelled: false,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.batch_error_count > 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}
