use crate::{
    error::StoreError,
    table::{ContinuationToken, Page, TableStore},
};
use async_trait::async_trait;
use model::records::{batch::MAX_BATCH_SIZE, row::Row};
use planner::{
    plan::QueryPlanGenerator,
    query::ast::{
        filter::{Column, KeyFilter},
        select::QueryDescriptor,
    },
};
use std::{collections::BTreeSet, ops::Bound, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Default)]
struct TableState {
    exists: bool,
    rows: BTreeSet<(String, String)>,
}

/// Ordered in-memory table with continuation-based pagination.
///
/// Clones share the same table.
#[derive(Debug, Clone)]
pub struct MemoryTableStore {
    name: String,
    page_size: usize,
    state: Arc<RwLock<TableState>>,
}

impl MemoryTableStore {
    /// A store whose table has not been created yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Arc::new(RwLock::new(TableState::default())),
        }
    }

    /// A store over an existing table holding `rows`.
    pub fn with_rows(name: impl Into<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        let state = TableState {
            exists: true,
            rows: rows
                .into_iter()
                .map(|r| (r.partition_key, r.row_key))
                .collect(),
        };
        Self {
            name: name.into(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Inserts a row, creating the table if needed. Returns false if the row
    /// was already present.
    pub async fn insert(&self, row: Row) -> bool {
        let mut state = self.state.write().await;
        state.exists = true;
        state.rows.insert((row.partition_key, row.row_key))
    }

    pub async fn exists(&self) -> bool {
        self.state.read().await.exists
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All rows in key order.
    pub async fn rows(&self) -> Vec<Row> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .map(|(pk, rk)| Row::new(pk.clone(), rk.clone()))
            .collect()
    }

    async fn fetch(
        &self,
        query: &QueryDescriptor,
        cursor: Option<(String, String)>,
        remaining: Option<usize>,
    ) -> Result<Page, StoreError> {
        let state = self.state.read().await;
        if !state.exists {
            return Err(StoreError::TableNotFound(self.name.clone()));
        }

        let lower = match (cursor, &query.filter) {
            (Some(position), _) => position,
            (None, KeyFilter::Range { from, .. }) => (from.clone(), String::new()),
            (None, KeyFilter::NotEmpty) => (String::new(), String::new()),
        };
        let limit = remaining.map_or(self.page_size, |r| r.min(self.page_size));
        let with_row_key = query.projects(Column::RowKey);

        let mut rows = Vec::with_capacity(limit.min(state.rows.len()));
        let mut next = None;
        let candidates = state
            .rows
            .range((Bound::Included(lower), Bound::Unbounded))
            .take_while(|(pk, _)| !past_range_end(&query.filter, pk))
            .filter(|(pk, _)| query.filter.matches(pk));

        for (pk, rk) in candidates {
            if rows.len() == limit {
                next = Some((pk.clone(), rk.clone()));
                break;
            }
            let row_key = if with_row_key { rk.clone() } else { String::new() };
            rows.push(Row::new(pk.clone(), row_key));
        }

        let remaining = remaining.map(|r| r - rows.len());
        let continuation = match next {
            Some((pk, rk)) if remaining != Some(0) => Some(ContinuationToken {
                query: query.clone(),
                next_partition_key: pk,
                next_row_key: rk,
                remaining,
            }),
            _ => None,
        };

        debug!(
            table = %self.name,
            rows = rows.len(),
            more = continuation.is_some(),
            "Served page"
        );
        Ok(Page { rows, continuation })
    }
}

fn past_range_end(filter: &KeyFilter, partition_key: &str) -> bool {
    match filter {
        KeyFilter::Range { to, .. } => partition_key >= to.as_str(),
        KeyFilter::NotEmpty => false,
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    fn table_name(&self) -> &str {
        &self.name
    }

    async fn ensure_table_exists(&self, name: &str) -> Result<(), StoreError> {
        if name != self.name {
            return Err(StoreError::Request(format!(
                "store is bound to table '{}', not '{name}'",
                self.name
            )));
        }

        let mut state = self.state.write().await;
        if !state.exists {
            state.exists = true;
            info!(table = %name, "Created table");
        }
        Ok(())
    }

    async fn query_by_partition_key_range(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Page, StoreError> {
        self.fetch(query, None, query.top).await
    }

    async fn next_page(&self, token: &ContinuationToken) -> Result<Page, StoreError> {
        if !token.query.filter.matches(&token.next_partition_key) {
            return Err(StoreError::InvalidContinuation(format!(
                "partition key '{}' is outside the query range",
                token.next_partition_key
            )));
        }

        let cursor = (token.next_partition_key.clone(), token.next_row_key.clone());
        self.fetch(&token.query, Some(cursor), token.remaining).await
    }

    async fn query_oldest_partition_key(&self) -> Result<Option<String>, StoreError> {
        let page = self
            .query_by_partition_key_range(&QueryPlanGenerator::oldest_partition())
            .await?;
        Ok(page.rows.into_iter().next().map(|row| row.partition_key))
    }

    async fn execute_delete_batch(
        &self,
        partition_key: &str,
        row_keys: &[String],
    ) -> Result<(), StoreError> {
        if row_keys.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge {
                size: row_keys.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let mut state = self.state.write().await;
        if !state.exists {
            return Err(StoreError::TableNotFound(self.name.clone()));
        }

        let keys: Vec<(String, String)> = row_keys
            .iter()
            .map(|rk| (partition_key.to_string(), rk.clone()))
            .collect();
        if let Some((pk, rk)) = keys.iter().find(|key| !state.rows.contains(*key)) {
            return Err(StoreError::EntityNotFound {
                partition_key: pk.clone(),
                row_key: rk.clone(),
            });
        }

        for key in &keys {
            state.rows.remove(key);
        }
        debug!(partition_key, rows = keys.len(), "Deleted batch");
        Ok(())
    }
}
