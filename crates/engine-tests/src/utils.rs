use async_trait::async_trait;
use connectors::{
    error::StoreError,
    memory::store::MemoryTableStore,
    table::{ContinuationToken, Page, TableStore},
};
use planner::query::ast::select::QueryDescriptor;
use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Memory store that counts every call and can be told to misbehave.
pub struct InstrumentedStore {
    inner: MemoryTableStore,
    range_queries: AtomicU64,
    next_pages: AtomicU64,
    oldest_queries: AtomicU64,
    deletes: AtomicU64,
    failing_partitions: HashSet<String>,
    fail_first_page: bool,
    page_delay: Option<Duration>,
}

impl InstrumentedStore {
    pub fn new(inner: MemoryTableStore) -> Self {
        Self {
            inner,
            range_queries: AtomicU64::new(0),
            next_pages: AtomicU64::new(0),
            oldest_queries: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            failing_partitions: HashSet::new(),
            fail_first_page: false,
            page_delay: None,
        }
    }

    /// Every delete batch for `partition_key` is rejected.
    pub fn fail_partition(mut self, partition_key: impl Into<String>) -> Self {
        self.failing_partitions.insert(partition_key.into());
        self
    }

    /// The first range query issued fails.
    pub fn fail_first_page(mut self) -> Self {
        self.fail_first_page = true;
        self
    }

    /// Every page request sleeps for `delay` first.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &MemoryTableStore {
        &self.inner
    }

    pub fn range_queries(&self) -> u64 {
        self.range_queries.load(Ordering::SeqCst)
    }

    pub fn next_pages(&self) -> u64 {
        self.next_pages.load(Ordering::SeqCst)
    }

    pub fn oldest_queries(&self) -> u64 {
        self.oldest_queries.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if let Some(delay) = self.page_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TableStore for InstrumentedStore {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    async fn ensure_table_exists(&self, name: &str) -> Result<(), StoreError> {
        self.inner.ensure_table_exists(name).await
    }

    async fn query_by_partition_key_range(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Page, StoreError> {
        let n = self.range_queries.fetch_add(1, Ordering::SeqCst) + 1;
        self.delay().await;
        if self.fail_first_page && n == 1 {
            return Err(StoreError::Unreachable("injected page failure".into()));
        }
        self.inner.query_by_partition_key_range(query).await
    }

    async fn next_page(&self, token: &ContinuationToken) -> Result<Page, StoreError> {
        self.next_pages.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.inner.next_page(token).await
    }

    async fn query_oldest_partition_key(&self) -> Result<Option<String>, StoreError> {
        self.oldest_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query_oldest_partition_key().await
    }

    async fn execute_delete_batch(
        &self,
        partition_key: &str,
        row_keys: &[String],
    ) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.failing_partitions.contains(partition_key) {
            return Err(StoreError::Request(format!(
                "injected failure for partition {partition_key}"
            )));
        }
        self.inner.execute_delete_batch(partition_key, row_keys).await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush().await
    }
}

/// A store whose every call reports the service as down.
pub struct UnreachableStore;

#[async_trait]
impl TableStore for UnreachableStore {
    fn table_name(&self) -> &str {
        "unreachable"
    }

    async fn ensure_table_exists(&self, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn query_by_partition_key_range(
        &self,
        _query: &QueryDescriptor,
    ) -> Result<Page, StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn next_page(&self, _token: &ContinuationToken) -> Result<Page, StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn query_oldest_partition_key(&self) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn execute_delete_batch(
        &self,
        _partition_key: &str,
        _row_keys: &[String],
    ) -> Result<(), StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }
}
