#[cfg(test)]
mod tests {
    use crate::{
        RETENTION_DAYS, TEST_TABLE, base_settings, days_ago, partition, seeded_store,
        utils::InstrumentedStore,
    };
    use chrono::{Duration, Utc};
    use connectors::{
        file::json::store::FileTableStore, memory::store::MemoryTableStore, table::TableStore,
    };
    use engine_config::settings::{split::SplitPolicy, strategy::Strategy};
    use engine_runtime::{
        error::PurgeError,
        execution::{purge, purge_within},
    };
    use model::{keys::partition_key::encode, time::period::Period};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    // Scenario: one expired partition of 250 rows next to a partition inside retention.
    // Expected Outcome:
    // - The expired partition is deleted in 3 batches (100, 100, 50).
    // - The fresh partition is untouched.
    #[traced_test]
    #[tokio::test]
    async fn tc01_expired_partition_is_batched() {
        let mut rows = partition(days_ago(45), 250);
        rows.extend(partition(days_ago(2), 10));
        let store = Arc::new(InstrumentedStore::new(MemoryTableStore::with_rows(
            TEST_TABLE, rows,
        )));

        let result = purge(store.clone(), base_settings(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.row_count, 250);
        assert_eq!(result.batch_count, 3);
        assert_eq!(result.partition_count, 1);
        assert!(!result.has_errors());
        assert_eq!(store.deletes(), 3);
        assert_eq!(store.inner().len().await, 10);
        assert!(logs_contain("Purge finished"));
    }

    // Scenario: the table does not exist yet.
    // Expected Outcome:
    // - The table gets created.
    // - The run ends with a non-fatal "no data" outcome and no range query or delete is issued.
    #[traced_test]
    #[tokio::test]
    async fn tc02_empty_table() {
        let store = Arc::new(InstrumentedStore::new(MemoryTableStore::new(TEST_TABLE)));

        let err = purge(store.clone(), base_settings(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PurgeError::NoDataFound { .. }));
        assert!(!err.is_fatal());
        assert_eq!(err.result().unwrap().row_count, 0);
        assert!(store.inner().exists().await);
        assert_eq!(store.oldest_queries(), 1);
        assert_eq!(store.range_queries(), 0);
        assert_eq!(store.deletes(), 0);
    }

    // Scenario: the oldest row is still inside the retention period.
    // Expected Outcome: a zero-effect result without a single range query.
    #[traced_test]
    #[tokio::test]
    async fn tc03_nothing_old_enough() {
        let store = Arc::new(InstrumentedStore::new(seeded_store([1, 5, 29], 20)));

        let result = purge(store.clone(), base_settings(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.row_count, 0);
        assert_eq!(result.batch_count, 0);
        assert_eq!(result.page_count, 0);
        assert_eq!(store.range_queries(), 0);
        assert_eq!(store.inner().len().await, 60);
        assert!(logs_contain("nothing to purge"));
    }

    // Scenario: the same table purged for real and in dry-run mode.
    // Expected Outcome:
    // - Both runs report identical counts.
    // - The dry run never calls delete and leaves every row in place.
    #[traced_test]
    #[tokio::test]
    async fn tc04_dry_run_matches_real_run() {
        let ages = (25..60).step_by(3);
        let real = Arc::new(InstrumentedStore::new(seeded_store(ages.clone(), 130)));
        let dry = Arc::new(InstrumentedStore::new(seeded_store(ages, 130)));
        let total = dry.inner().len().await;

        let real_result = purge(real.clone(), base_settings(), CancellationToken::new())
            .await
            .unwrap();
        let dry_result = purge(
            dry.clone(),
            base_settings().with_dry_run(true),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(real_result.row_count, dry_result.row_count);
        assert_eq!(real_result.batch_count, dry_result.batch_count);
        assert_eq!(real_result.partition_count, dry_result.partition_count);
        assert!(dry_result.dry_run);
        assert_eq!(dry.deletes(), 0);
        assert_eq!(dry.inner().len().await, total);
        assert_eq!(real.deletes(), real_result.batch_count);
        assert!(logs_contain("Dry run is ENABLED"));
    }

    // Scenario: many partitions purged by both scheduling strategies and several split policies.
    // Expected Outcome: every strategy deletes exactly the expired rows.
    #[traced_test]
    #[tokio::test]
    async fn tc05_strategies_and_splits_agree() {
        let ages: Vec<i64> = (1..120).collect();
        let expired = ages.iter().filter(|&&age| age >= i64::from(RETENTION_DAYS)).count();

        let cases = [
            (Strategy::FanIn, SplitPolicy::Workers),
            (Strategy::WorkerPool, SplitPolicy::Workers),
            (Strategy::WorkerPool, SplitPolicy::Count(11)),
            (Strategy::WorkerPool, SplitPolicy::Every { seconds: 86_400 * 5 }),
        ];
        for (strategy, split) in cases {
            let label = format!("{strategy} / {split}");
            let memory = seeded_store(ages.iter().copied(), 7).with_page_size(16);
            let store = Arc::new(InstrumentedStore::new(memory));
            let settings = base_settings()
                .with_strategy(strategy)
                .with_split(split)
                .with_worker_count(3);

            let result = purge(store.clone(), settings, CancellationToken::new())
                .await
                .unwrap();

            assert_eq!(result.row_count, (expired * 7) as u64, "{label}");
            assert_eq!(result.batch_error_count, 0, "{label}");
            assert_eq!(
                store.inner().len().await,
                (ages.len() - expired) * 7,
                "{label}"
            );
        }
    }

    // Scenario: an explicit period in the middle of the table.
    // Expected Outcome: only rows with a key in [from, to) are deleted.
    #[traced_test]
    #[tokio::test]
    async fn tc06_purge_within_period() {
        let anchor = Utc::now() - Duration::days(400);
        let rows = (0..20).flat_map(|d| partition(anchor + Duration::days(d), 3));
        let store = MemoryTableStore::with_rows(TEST_TABLE, rows);

        let from = anchor + Duration::days(5);
        let to = anchor + Duration::days(15);
        let result = purge_within(
            Arc::new(store.clone()),
            Period::new(from, to).unwrap(),
            base_settings().with_worker_count(1),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.row_count, 30);
        let remaining = store.rows().await;
        assert_eq!(remaining.len(), 30);
        let (lo, hi) = (encode(from), encode(to));
        assert!(
            remaining
                .iter()
                .all(|row| row.partition_key.as_str() < lo.as_str()
                    || row.partition_key.as_str() >= hi.as_str())
        );
    }

    // Scenario: a JSON file-backed table purged and flushed.
    // Expected Outcome: reopening the file shows only the rows inside retention.
    #[traced_test]
    #[tokio::test]
    async fn tc07_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        let seed = FileTableStore::open(&path, TEST_TABLE).await.unwrap();
        seed.ensure_table_exists(TEST_TABLE).await.unwrap();
        for age in [3, 40, 90] {
            for row in partition(days_ago(age), 4) {
                seed.insert(row).await;
            }
        }
        seed.flush().await.unwrap();

        let store = Arc::new(FileTableStore::open(&path, TEST_TABLE).await.unwrap());
        let result = purge(store.clone(), base_settings(), CancellationToken::new())
            .await
            .unwrap();
        store.flush().await.unwrap();
        assert_eq!(result.row_count, 8);

        let reopened = FileTableStore::open(&path, TEST_TABLE).await.unwrap();
        let rows = reopened.rows().await;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].partition_key, rows[3].partition_key);
    }
}
