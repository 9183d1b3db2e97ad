use crate::metrics::Metrics;
use connectors::table::TableStore;
use model::records::batch::MAX_BATCH_SIZE;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Everything a pipeline stage needs besides its own input.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn TableStore>,
    pub metrics: Metrics,
    pub cancel: CancellationToken,
    pub dry_run: bool,
    /// Capacity of the channels between stages.
    pub channel_capacity: usize,
    pub max_batch_size: usize,
}

impl PipelineContext {
    pub fn new(store: Arc<dyn TableStore>, cancel: CancellationToken) -> Self {
        Self {
            store,
            metrics: Metrics::new(),
            cancel,
            dry_run: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
