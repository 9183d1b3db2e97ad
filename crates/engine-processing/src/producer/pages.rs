use crate::{error::ProducerError, producer::PageResult};
use connectors::table::{ContinuationToken, Page, TableStore};
use engine_core::{channel, context::pipeline::PipelineContext};
use planner::query::{ast::select::QueryDescriptor, renderer::render};
use std::{sync::Arc, time::Instant};
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{Instrument, debug, error, info};

/// A progress line is logged every this many pages of one stream.
pub const PROGRESS_EVERY: u64 = 100;

/// Walks one query's pages by following continuation tokens.
pub struct PageReader {
    store: Arc<dyn TableStore>,
    query: QueryDescriptor,
    next: Option<ContinuationToken>,
    started: bool,
    pages: u64,
}

impl PageReader {
    pub fn new(store: Arc<dyn TableStore>, query: QueryDescriptor) -> Self {
        Self {
            store,
            query,
            next: None,
            started: false,
            pages: 0,
        }
    }

    /// Pages requested so far, failed ones included.
    pub fn pages(&self) -> u64 {
        self.pages
    }

    pub fn is_done(&self) -> bool {
        self.started && self.next.is_none()
    }

    /// Requests the next page. Returns `None` once the store has no more
    /// pages. A failed request leaves no continuation, so it also ends the
    /// stream.
    pub async fn next_page(&mut self) -> Option<PageResult> {
        if self.is_done() {
            return None;
        }

        self.pages += 1;
        self.started = true;
        let fetched = match self.next.take() {
            None => self.store.query_by_partition_key_range(&self.query).await,
            Some(token) => self.store.next_page(&token).await,
        };

        Some(match fetched {
            Ok(Page { rows, continuation }) => {
                self.next = continuation;
                Ok(rows)
            }
            Err(source) => Err(ProducerError::Fetch {
                query: render(&self.query.filter),
                page: self.pages,
                source,
            }),
        })
    }
}

/// Spawns the task that streams `query`'s pages into the returned channel.
pub fn spawn_page_stream(
    query: QueryDescriptor,
    ctx: &PipelineContext,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<PageResult> {
    let (tx, rx) = mpsc::channel(ctx.channel_capacity);
    let reader = PageReader::new(ctx.store.clone(), query);
    tasks.spawn(stream_pages(reader, ctx.clone(), tx).in_current_span());
    rx
}

async fn stream_pages(
    mut reader: PageReader,
    ctx: PipelineContext,
    tx: mpsc::Sender<PageResult>,
) {
    let filter = render(&reader.query.filter);
    info!(filter = %filter, "Querying entities");

    loop {
        let started = Instant::now();
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            next = reader.next_page() => next,
        };
        let Some(result) = next else {
            break;
        };

        let elapsed = started.elapsed();
        match &result {
            Ok(rows) => {
                ctx.metrics.record_page(elapsed);
                debug!(page = reader.pages(), rows = rows.len(), "Fetched page");
                if reader.pages() % PROGRESS_EVERY == 0 {
                    info!(pages = reader.pages(), "Processed pages");
                }
            }
            Err(err) => {
                ctx.metrics.record_page_failure(elapsed);
                error!(error = %err, "Page fetch failed, ending stream");
            }
        }

        if !channel::send(&tx, result, &ctx.cancel).await {
            break;
        }
    }

    info!(pages = reader.pages(), filter = %filter, "Finished querying");
}
