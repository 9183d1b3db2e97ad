use crate::coordinator::{SchedulingStrategy, merge::fan_in};
use engine_core::{channel, context::pipeline::PipelineContext};
use engine_processing::{consumer::executor::BatchExecutor, pipeline::spawn_split_pipelines};
use futures::lock::Mutex;
use model::{execution::outcome::BatchOutcome, time::period::Period};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{Instrument, debug, debug_span};

/// All sub-periods feed one bounded chunk queue drained by a fixed number of
/// executors, so store concurrency does not depend on the split count.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPoolStrategy {
    workers: usize,
    queue_capacity: usize,
}

impl WorkerPoolStrategy {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
        }
    }
}

impl SchedulingStrategy for WorkerPoolStrategy {
    fn name(&self) -> &'static str {
        "worker-pool"
    }

    fn schedule(
        &self,
        splits: &[Period],
        ctx: &PipelineContext,
        tasks: &mut JoinSet<()>,
    ) -> mpsc::Receiver<BatchOutcome> {
        let streams = spawn_split_pipelines(splits, ctx, tasks);
        let queue = Arc::new(Mutex::new(fan_in(
            streams,
            self.queue_capacity,
            &ctx.cancel,
            tasks,
        )));

        let (tx, rx) = mpsc::channel(ctx.channel_capacity);
        for worker in 0..self.workers {
            let queue = queue.clone();
            let tx = tx.clone();
            let cancel = ctx.cancel.clone();
            let executor = BatchExecutor::from_context(ctx);

            tasks.spawn(
                async move {
                    let mut executed = 0u64;
                    loop {
                        let chunk = {
                            let mut queue = queue.lock().await;
                            channel::recv(&mut queue, &cancel).await
                        };
                        let Some(chunk) = chunk else {
                            break;
                        };

                        let outcome = executor.execute(chunk).await;
                        executed += 1;
                        if !channel::send(&tx, outcome, &cancel).await {
                            break;
                        }
                    }
                    debug!(batches = executed, "Worker finished");
                }
                .instrument(debug_span!("worker", index = worker)),
            );
        }

        rx
    }
}
