use crate::error::ConsumerError;
use connectors::table::TableStore;
use engine_core::{channel, context::pipeline::PipelineContext, metrics::Metrics};
use model::{execution::outcome::BatchOutcome, records::batch::BatchChunk};
use std::{sync::Arc, time::Instant};
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{Instrument, debug, error};

/// Submits chunks as atomic delete batches and records what happened.
#[derive(Clone)]
pub struct BatchExecutor {
    store: Arc<dyn TableStore>,
    metrics: Metrics,
    dry_run: bool,
}

impl BatchExecutor {
    pub fn new(store: Arc<dyn TableStore>, metrics: Metrics, dry_run: bool) -> Self {
        Self {
            store,
            metrics,
            dry_run,
        }
    }

    pub fn from_context(ctx: &PipelineContext) -> Self {
        Self::new(ctx.store.clone(), ctx.metrics.clone(), ctx.dry_run)
    }

    /// Executes one chunk. In dry-run mode the store is never called but the
    /// chunk still counts as processed.
    pub async fn execute(&self, chunk: BatchChunk) -> BatchOutcome {
        let started = Instant::now();
        let size = chunk.len();
        debug!(partition_key = %chunk.partition_key, rows = size, "Executing table batch");

        let result = if self.dry_run {
            Ok(())
        } else {
            self.store
                .execute_delete_batch(&chunk.partition_key, &chunk.row_keys())
                .await
                .map_err(|source| ConsumerError::DeleteBatch {
                    partition_key: chunk.partition_key.clone(),
                    rows: size,
                    source,
                })
        };

        let outcome = match result {
            Ok(()) => BatchOutcome::success(chunk.partition_key, size, started.elapsed()),
            Err(err) => {
                error!(error = %err, "Error executing batch");
                BatchOutcome::failure(chunk.partition_key, size, err.to_string(), started.elapsed())
            }
        };
        self.metrics.record_outcome(&outcome);
        outcome
    }
}

/// Spawns an executor that drains `chunks` one at a time.
pub fn spawn_executor(
    mut chunks: mpsc::Receiver<BatchChunk>,
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<BatchOutcome> {
    let (tx, rx) = mpsc::channel(ctx.channel_capacity);
    let executor = BatchExecutor::from_context(ctx);
    let cancel = ctx.cancel.clone();

    tasks.spawn(
        async move {
            while let Some(chunk) = channel::recv(&mut chunks, &cancel).await {
                let outcome = executor.execute(chunk).await;
                if !channel::send(&tx, outcome, &cancel).await {
                    return;
                }
            }
        }
        .in_current_span(),
    );

    rx
}
