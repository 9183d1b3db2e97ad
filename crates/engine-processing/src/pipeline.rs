//! Wires the per-split stages: pages -> partition groups -> batch chunks.

use crate::{
    producer::pages::spawn_page_stream,
    transform::{chunker::spawn_chunker, grouper::spawn_grouper},
};
use engine_core::context::pipeline::PipelineContext;
use model::{records::batch::BatchChunk, time::period::Period};
use planner::{plan::QueryPlanGenerator, query::ast::select::QueryDescriptor};
use tokio::{sync::mpsc, task::JoinSet};
use tracing::info_span;

/// Spawns one read pipeline per sub-period and returns their chunk streams in
/// split order.
pub fn spawn_split_pipelines(
    splits: &[Period],
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> Vec<mpsc::Receiver<BatchChunk>> {
    splits
        .iter()
        .zip(QueryPlanGenerator::for_splits(splits))
        .enumerate()
        .map(|(index, (period, query))| spawn_split_pipeline(index, period, query, ctx, tasks))
        .collect()
}

/// Spawns the read side of one sub-period's pipeline and returns its chunk
/// stream. Every stage is spawned onto `tasks`.
pub fn spawn_split_pipeline(
    split: usize,
    period: &Period,
    query: QueryDescriptor,
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<BatchChunk> {
    let span = info_span!("split", index = split, period = %period);
    let _enter = span.enter();

    let pages = spawn_page_stream(query, ctx, tasks);
    let groups = spawn_grouper(pages, ctx, tasks);
    spawn_chunker(groups, ctx, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use connectors::memory::store::MemoryTableStore;
    use model::{keys::partition_key::PartitionKey, records::row::Row};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_single_partition_of_250_rows() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let key = PartitionKey::encode(start + Duration::hours(1)).to_string();
        let rows: Vec<Row> = (0..250).map(|i| Row::new(key.clone(), format!("{i:03}"))).collect();

        let store = MemoryTableStore::with_rows("t", rows);
        let ctx = PipelineContext::new(Arc::new(store), CancellationToken::new());
        let period = Period::new(start, start + Duration::days(1)).unwrap();
        let mut tasks = JoinSet::new();

        let query = QueryPlanGenerator::for_period(&period);
        let mut chunks = spawn_split_pipeline(0, &period, query, &ctx, &mut tasks);
        let mut sizes = Vec::new();
        while let Some(chunk) = chunks.recv().await {
            assert_eq!(chunk.partition_key, key);
            sizes.push(chunk.len());
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(ctx.metrics.snapshot().partitions, 1);
        assert_eq!(ctx.metrics.snapshot().pages, 1);
    }

    #[tokio::test]
    async fn test_rows_outside_period_are_not_read() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let period = Period::new(start, start + Duration::days(1)).unwrap();
        let rows = vec![
            Row::new(PartitionKey::encode(start - Duration::seconds(1)), "before"),
            Row::new(PartitionKey::encode(start), "first"),
            Row::new(PartitionKey::encode(period.end()), "end"),
        ];

        let store = MemoryTableStore::with_rows("t", rows);
        let ctx = PipelineContext::new(Arc::new(store), CancellationToken::new());
        let mut tasks = JoinSet::new();

        let mut chunks = spawn_split_pipelines(&[period], &ctx, &mut tasks);
        let mut read = Vec::new();
        while let Some(chunk) = chunks[0].recv().await {
            read.extend(chunk.row_keys());
        }
        assert_eq!(read, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_sub_period_end_tick_is_read_exactly_once() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let window = Period::new(start, start + Duration::days(2)).unwrap();
        let splits = window.split(2);
        let rows = vec![
            Row::new(PartitionKey::encode(splits[0].end()), "edge"),
            Row::new(PartitionKey::encode(splits[1].start()), "next"),
        ];

        let store = MemoryTableStore::with_rows("t", rows);
        let ctx = PipelineContext::new(Arc::new(store), CancellationToken::new());
        let mut tasks = JoinSet::new();

        let mut read = Vec::new();
        for mut chunks in spawn_split_pipelines(&splits, &ctx, &mut tasks) {
            while let Some(chunk) = chunks.recv().await {
                read.extend(chunk.row_keys());
            }
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(read, vec!["edge".to_string(), "next".to_string()]);
        assert_eq!(ctx.metrics.snapshot().partitions, 2);
    }
}
