use engine_core::{channel, context::pipeline::PipelineContext};
use model::records::{
    batch::{BatchChunk, MAX_BATCH_SIZE},
    group::PartitionGroup,
};
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{Instrument, debug};

/// Cuts a group into contiguous chunks of at most `size` rows. `size` is
/// clamped to `1..=MAX_BATCH_SIZE`.
pub fn chunk_partition(group: PartitionGroup, size: usize) -> Vec<BatchChunk> {
    let size = size.clamp(1, MAX_BATCH_SIZE);
    let PartitionGroup { key, rows } = group;

    let mut chunks = Vec::with_capacity(rows.len().div_ceil(size));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        chunks.push(BatchChunk {
            partition_key: key.clone(),
            rows: rows.by_ref().take(size).collect(),
        });
    }
    chunks
}

pub fn spawn_chunker(
    mut groups: mpsc::Receiver<PartitionGroup>,
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<BatchChunk> {
    let (tx, rx) = mpsc::channel(ctx.channel_capacity);
    let ctx = ctx.clone();

    tasks.spawn(
        async move {
            while let Some(group) = channel::recv(&mut groups, &ctx.cancel).await {
                debug!(partition_key = %group.key, rows = group.len(), "Chunking partition");
                for chunk in chunk_partition(group, ctx.max_batch_size) {
                    if !channel::send(&tx, chunk, &ctx.cancel).await {
                        return;
                    }
                }
            }
        }
        .in_current_span(),
    );

    rx
}
