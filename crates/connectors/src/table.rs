use crate::error::StoreError;
use async_trait::async_trait;
use model::records::row::Row;
use planner::query::ast::select::QueryDescriptor;

/// Cursor returned by the store for fetching the page after the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub query: QueryDescriptor,
    pub next_partition_key: String,
    pub next_row_key: String,
    /// Rows still allowed by the query's `top`, if it has one.
    pub remaining: Option<usize>,
}

/// One page of a range query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<Row>,
    pub continuation: Option<ContinuationToken>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// The store operations a purge run depends on. Implementations are bound to
/// a single table.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Name of the table this store operates on.
    fn table_name(&self) -> &str;

    async fn ensure_table_exists(&self, name: &str) -> Result<(), StoreError>;

    /// Runs a key-range query and returns its first page. Rows come back in
    /// ascending `(partition_key, row_key)` order.
    async fn query_by_partition_key_range(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Page, StoreError>;

    async fn next_page(&self, token: &ContinuationToken) -> Result<Page, StoreError>;

    /// Smallest partition key in the table, or `None` when it holds no rows.
    async fn query_oldest_partition_key(&self) -> Result<Option<String>, StoreError>;

    /// Deletes all `row_keys` within `partition_key` atomically.
    async fn execute_delete_batch(
        &self,
        partition_key: &str,
        row_keys: &[String],
    ) -> Result<(), StoreError>;

    /// Persists pending changes. A no-op for stores that write through.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
