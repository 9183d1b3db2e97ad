#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use connectors::memory::store::MemoryTableStore;
use engine_config::settings::PurgeSettings;
use model::{keys::partition_key::encode, records::row::Row};

pub mod integration;
pub mod utils;

pub const TEST_TABLE: &str = "telemetry";
pub const RETENTION_DAYS: u32 = 30;

/// Settings every scenario starts from.
pub fn base_settings() -> PurgeSettings {
    PurgeSettings::new(TEST_TABLE)
        .with_retention_days(RETENTION_DAYS)
        .with_worker_count(4)
}

/// `count` rows sharing the partition key of `ts`.
pub fn partition(ts: DateTime<Utc>, count: usize) -> Vec<Row> {
    let key = encode(ts);
    (0..count)
        .map(|n| Row::new(key.as_str(), format!("row-{n:05}")))
        .collect()
}

/// An instant `days` days and a few minutes before now.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days) - Duration::minutes(7)
}

/// One partition per entry of `ages`, each holding `per_partition` rows.
pub fn seeded_store(ages: impl IntoIterator<Item = i64>, per_partition: usize) -> MemoryTableStore {
    let rows = ages
        .into_iter()
        .flat_map(|age| partition(days_ago(age), per_partition));
    MemoryTableStore::with_rows(TEST_TABLE, rows)
}
