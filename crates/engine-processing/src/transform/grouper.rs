use crate::producer::PageResult;
use engine_core::{channel, context::pipeline::PipelineContext};
use model::records::{group::PartitionGroup, row::Row};
use std::collections::HashMap;
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{Instrument, debug, warn};

/// Groups one page's rows by partition key. Groups come out in order of each
/// key's first appearance and keep the page's row order.
pub fn group_by_partition(rows: Vec<Row>) -> Vec<PartitionGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<PartitionGroup> = Vec::new();

    for row in rows {
        match index.get(&row.partition_key) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(row.partition_key.clone(), groups.len());
                groups.push(PartitionGroup {
                    key: row.partition_key.clone(),
                    rows: vec![row],
                });
            }
        }
    }

    groups
}

/// Spawns the grouping stage. Failed pages are skipped.
pub fn spawn_grouper(
    mut pages: mpsc::Receiver<PageResult>,
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<PartitionGroup> {
    let (tx, rx) = mpsc::channel(ctx.channel_capacity);
    let ctx = ctx.clone();

    tasks.spawn(
        async move {
            while let Some(page) = channel::recv(&mut pages, &ctx.cancel).await {
                let rows = match page {
                    Ok(rows) => rows,
                    Err(err) => {
                        warn!(error = %err, "Skipping page in failed state");
                        continue;
                    }
                };

                let groups = group_by_partition(rows);
                debug!(partitions = groups.len(), "Partitioned page");
                ctx.metrics.record_partitions(groups.len() as u64);

                for group in groups {
                    if !channel::send(&tx, group, &ctx.cancel).await {
                        return;
                    }
                }
            }
        }
        .in_current_span(),
    );

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProducerError;
    use connectors::{error::StoreError, memory::store::MemoryTableStore};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let rows = vec![
            Row::new("b", "1"),
            Row::new("a", "1"),
            Row::new("b", "2"),
            Row::new("c", "1"),
            Row::new("a", "2"),
        ];

        let groups = group_by_partition(rows);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(groups[0].rows, vec![Row::new("b", "1"), Row::new("b", "2")]);
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[2].len(), 1);
    }

    #[test]
    fn test_empty_page_has_no_groups() {
        assert!(group_by_partition(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_stage_skips_failed_pages() {
        let store = MemoryTableStore::with_rows("t", Vec::new());
        let ctx = PipelineContext::new(Arc::new(store), CancellationToken::new());
        let mut tasks = JoinSet::new();

        let (tx, rx) = mpsc::channel(4);
        let mut groups = spawn_grouper(rx, &ctx, &mut tasks);

        tx.send(Ok(vec![Row::new("a", "1"), Row::new("b", "1")]))
            .await
            .unwrap();
        tx.send(Err(ProducerError::Fetch {
            query: "q".into(),
            page: 2,
            source: StoreError::Request("boom".into()),
        }))
        .await
        .unwrap();
        // Same key again in a later page: a separate group.
        tx.send(Ok(vec![Row::new("a", "2")])).await.unwrap();
        drop(tx);

        let mut keys = Vec::new();
        while let Some(group) = groups.recv().await {
            keys.push(group.key);
        }
        assert_eq!(keys, vec!["a", "b", "a"]);
        assert_eq!(ctx.metrics.snapshot().partitions, 3);
    }
}
