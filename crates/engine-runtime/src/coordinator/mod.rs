use crate::coordinator::{fan_in::FanInStrategy, worker_pool::WorkerPoolStrategy};
use engine_config::settings::{PurgeSettings, strategy::Strategy};
use engine_core::context::pipeline::PipelineContext;
use model::{execution::outcome::BatchOutcome, time::period::Period};
use tokio::{sync::mpsc, task::JoinSet};

pub mod fan_in;
pub mod merge;
pub mod worker_pool;

/// Runs a set of sub-period pipelines and merges their batch outcomes.
///
/// Implementations spawn every task onto `tasks` and return a channel that
/// closes once all inputs are exhausted and in-flight batches have settled.
pub trait SchedulingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn schedule(
        &self,
        splits: &[Period],
        ctx: &PipelineContext,
        tasks: &mut JoinSet<()>,
    ) -> mpsc::Receiver<BatchOutcome>;
}

pub fn strategy_for(settings: &PurgeSettings) -> Box<dyn SchedulingStrategy> {
    match settings.strategy {
        Strategy::FanIn => Box::new(FanInStrategy),
        Strategy::WorkerPool => Box::new(WorkerPoolStrategy::new(
            settings.worker_count,
            settings.queue_capacity,
        )),
    }
}
