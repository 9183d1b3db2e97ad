use crate::{
    coordinator::strategy_for,
    error::PurgeError,
    execution::window::{compute_window, retention_cutoff},
};
use chrono::{DateTime, Utc};
use connectors::table::TableStore;
use engine_config::settings::PurgeSettings;
use engine_core::{
    channel, context::pipeline::PipelineContext, metrics::Metrics, stage::PurgeStage,
};
use model::{
    core::identifiers::RunId,
    execution::result::PurgeResult,
    keys::partition_key,
    time::period::{Period, log_periods},
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Deletes every row older than the configured retention.
pub async fn purge(
    store: Arc<dyn TableStore>,
    settings: PurgeSettings,
    cancel: CancellationToken,
) -> Result<PurgeResult, PurgeError> {
    PurgeExecutor::new(store, settings, cancel)?.purge().await
}

/// Deletes every row whose partition key falls in `period`.
pub async fn purge_within(
    store: Arc<dyn TableStore>,
    period: Period,
    settings: PurgeSettings,
    cancel: CancellationToken,
) -> Result<PurgeResult, PurgeError> {
    PurgeExecutor::new(store, settings, cancel)?
        .purge_within(period)
        .await
}

/// Drives one purge run through its stages.
pub struct PurgeExecutor {
    store: Arc<dyn TableStore>,
    settings: PurgeSettings,
    cancel: CancellationToken,
    metrics: Metrics,
    run_id: RunId,
    stage: PurgeStage,
    used: bool,
}

impl PurgeExecutor {
    pub fn new(
        store: Arc<dyn TableStore>,
        settings: PurgeSettings,
        cancel: CancellationToken,
    ) -> Result<Self, PurgeError> {
        settings.validate()?;
        Ok(Self {
            store,
            settings,
            cancel,
            metrics: Metrics::new(),
            run_id: RunId::generate(),
            stage: PurgeStage::Init,
            used: false,
        })
    }

    /// Overrides the generated id of the first run.
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn stage(&self) -> PurgeStage {
        self.stage
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn purge(&mut self) -> Result<PurgeResult, PurgeError> {
        self.begin_run();
        let span = info_span!("purge", run_id = %self.run_id, table = %self.settings.table_name);
        async {
            let base = self.start();
            self.ensure_table().await?;

            self.advance(PurgeStage::DiscoverOldest);
            let oldest = self.discover_oldest(&base).await?;

            self.advance(PurgeStage::ComputeWindow);
            let window = match compute_window(oldest, self.settings.retention_days, Utc::now()) {
                Ok(Some(window)) => window,
                Ok(None) => {
                    let mut result = base;
                    result.min_date = Some(oldest);
                    result.max_date =
                        retention_cutoff(self.settings.retention_days, Utc::now()).ok();
                    warn!(
                        oldest = %oldest,
                        retention_days = self.settings.retention_days,
                        "Oldest entity is within the retention period, nothing to purge"
                    );
                    return Ok(self.summarize(result));
                }
                Err(err) => return Err(self.fail(err)),
            };

            self.run(window, base).await
        }
        .instrument(span)
        .await
    }

    pub async fn purge_within(&mut self, period: Period) -> Result<PurgeResult, PurgeError> {
        self.begin_run();
        let span = info_span!("purge", run_id = %self.run_id, table = %self.settings.table_name);
        async {
            let base = self.start();
            self.ensure_table().await?;

            self.advance(PurgeStage::ComputeWindow);
            if period.is_empty() {
                warn!(period = %period, "Empty period, nothing to purge");
                let mut result = base;
                result.min_date = Some(period.start());
                result.max_date = Some(period.end());
                return Ok(self.summarize(result));
            }

            self.run(period, base).await
        }
        .instrument(span)
        .await
    }

    /// Every run after the first gets its own id and counters.
    fn begin_run(&mut self) {
        if self.used {
            self.metrics = Metrics::new();
            self.run_id = RunId::generate();
        }
        self.used = true;
    }

    fn start(&mut self) -> PurgeResult {
        self.stage = PurgeStage::Init;
        if self.settings.dry_run {
            warn!("Dry run is ENABLED");
        }
        info!(
            strategy = %self.settings.strategy,
            workers = self.settings.worker_count,
            split = %self.settings.split,
            "Starting purge"
        );
        PurgeResult::started(self.run_id.clone(), Utc::now(), self.settings.dry_run)
    }

    fn advance(&mut self, next: PurgeStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid stage transition {} -> {next}",
            self.stage
        );
        debug!(from = %self.stage, to = %next, "Stage transition");
        self.stage = next;
    }

    fn fail(&mut self, err: PurgeError) -> PurgeError {
        if err.is_fatal() {
            error!(stage = %self.stage, error = %err, "Purge failed");
        } else {
            warn!(stage = %self.stage, "{err}");
        }
        self.advance(PurgeStage::Failed);
        err
    }

    async fn ensure_table(&mut self) -> Result<(), PurgeError> {
        let table = self.settings.table_name.clone();
        self.store
            .ensure_table_exists(&table)
            .await
            .map_err(|source| self.fail(PurgeError::Setup { source }))
    }

    async fn discover_oldest(&mut self, base: &PurgeResult) -> Result<DateTime<Utc>, PurgeError> {
        let oldest = match self.store.query_oldest_partition_key().await {
            Ok(Some(key)) => key,
            Ok(None) => {
                let result = self.metrics.freeze(base.clone());
                return Err(self.fail(PurgeError::NoDataFound {
                    table: self.settings.table_name.clone(),
                    result: Box::new(result),
                }));
            }
            Err(source) => return Err(self.fail(PurgeError::Setup { source })),
        };

        match partition_key::decode(&oldest) {
            Ok(ts) => {
                debug!(partition_key = %oldest, oldest = %ts, "Oldest partition key");
                Ok(ts)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    async fn run(&mut self, window: Period, mut base: PurgeResult) -> Result<PurgeResult, PurgeError> {
        self.advance(PurgeStage::Running);
        info!(window = %window, "Starting purging all entities in window");
        base.min_date = Some(window.start());
        base.max_date = Some(window.end());

        let splits = self
            .settings
            .split
            .split(&window, self.settings.worker_count);
        log_periods(&splits);

        let ctx = PipelineContext::new(self.store.clone(), self.cancel.child_token())
            .with_metrics(self.metrics.clone())
            .with_dry_run(self.settings.dry_run)
            .with_channel_capacity(self.settings.channel_capacity)
            .with_max_batch_size(self.settings.max_batch_size);
        let strategy = strategy_for(&self.settings);
        info!(
            strategy = strategy.name(),
            splits = splits.len(),
            "Spinning up batch processors"
        );

        let mut tasks = JoinSet::new();
        // Stops every stage if this future is dropped before the run settles.
        let _guard = ctx.cancel.clone().drop_guard();
        let mut outcomes = strategy.schedule(&splits, &ctx, &mut tasks);

        let mut failed = 0u64;
        while let Some(outcome) = channel::recv(&mut outcomes, &ctx.cancel).await {
            if !outcome.is_success() {
                failed += 1;
            }
        }
        drop(outcomes);

        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Err(err) if err.is_panic() => {
                    panicked.get_or_insert(err);
                }
                _ => {}
            }
        }
        if let Some(err) = panicked {
            return Err(self.fail(err.into()));
        }

        base.cancelled = self.cancel.is_cancelled();
        if base.cancelled {
            warn!("Purge cancelled, reporting partial result");
        }
        debug!(failed_batches = failed, "All pipelines settled");
        Ok(self.summarize(base))
    }

    fn summarize(&mut self, base: PurgeResult) -> PurgeResult {
        self.advance(PurgeStage::Summarize);
        let result = self.metrics.freeze(base);
        info!(
            pages = result.page_count,
            page_errors = result.page_error_count,
            partitions = result.partition_count,
            rows = result.row_count,
            batches = result.batch_count,
            batch_errors = result.batch_error_count,
            row_errors = result.row_error_count,
            duration_ms = result.duration_ms(),
            "Purge finished"
        );
        self.advance(PurgeStage::Done);
        result
    }
}
