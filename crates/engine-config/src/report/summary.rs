use crate::settings::{PurgeSettings, split::SplitPolicy, strategy::Strategy};
use engine_core::metrics::{MetricsSnapshot, TimerSnapshot};
use model::execution::result::PurgeResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    CompletedWithErrors,
    NothingToPurge,
    Cancelled,
}

/// Settings echoed back in the report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub table_name: String,
    pub retention_days: u32,
    pub worker_count: usize,
    pub strategy: Strategy,
    pub split: SplitPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timings {
    pub duration_ms: i64,
    pub page: TimerSnapshot,
    pub batch: TimerSnapshot,
}

/// What the CLI prints once a run is over.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub status: RunStatus,
    pub result: PurgeResult,
    pub settings: RunSettings,
    pub timings: Timings,
}

impl SummaryReport {
    pub fn new(result: PurgeResult, metrics: &MetricsSnapshot, settings: &PurgeSettings) -> Self {
        Self::build(status_of(&result), result, metrics, settings)
    }

    /// Report for a run that found nothing to delete.
    pub fn nothing_to_purge(result: PurgeResult, settings: &PurgeSettings) -> Self {
        Self::build(
            RunStatus::NothingToPurge,
            result,
            &MetricsSnapshot::default(),
            settings,
        )
    }

    fn build(
        status: RunStatus,
        result: PurgeResult,
        metrics: &MetricsSnapshot,
        settings: &PurgeSettings,
    ) -> Self {
        let timings = Timings {
            duration_ms: result.duration_ms(),
            page: metrics.page_duration,
            batch: metrics.batch_duration,
        };
        SummaryReport {
            status,
            settings: RunSettings {
                table_name: settings.table_name.clone(),
                retention_days: settings.retention_days,
                worker_count: settings.worker_count,
                strategy: settings.strategy,
                split: settings.split,
            },
            result,
            timings,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn status_of(result: &PurgeResult) -> RunStatus {
    if result.cancelled {
        RunStatus::Cancelled
    } else if result.has_errors() {
        RunStatus::CompletedWithErrors
    } else if result.batch_count == 0 && result.page_count == 0 {
        RunStatus::NothingToPurge
    } else {
        RunStatus::Completed
    }
}
