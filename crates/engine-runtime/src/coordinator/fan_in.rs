use crate::coordinator::{SchedulingStrategy, merge::fan_in};
use engine_core::context::pipeline::PipelineContext;
use engine_processing::{consumer::executor::spawn_executor, pipeline::spawn_split_pipelines};
use model::{execution::outcome::BatchOutcome, time::period::Period};
use tokio::{sync::mpsc, task::JoinSet};

/// Every sub-period gets its own executor; outcomes are merged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanInStrategy;

impl SchedulingStrategy for FanInStrategy {
    fn name(&self) -> &'static str {
        "fan-in"
    }

    fn schedule(
        &self,
        splits: &[Period],
        ctx: &PipelineContext,
        tasks: &mut JoinSet<()>,
    ) -> mpsc::Receiver<BatchOutcome> {
        let outcomes = spawn_split_pipelines(splits, ctx, tasks)
            .into_iter()
            .map(|chunks| spawn_executor(chunks, ctx, tasks))
            .collect();
        fan_in(outcomes, ctx.channel_capacity, &ctx.cancel, tasks)
    }
}
