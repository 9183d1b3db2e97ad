use crate::{
    error::StoreError,
    file::json::snapshot::TableSnapshot,
    memory::store::MemoryTableStore,
    table::{ContinuationToken, Page, TableStore},
};
use async_trait::async_trait;
use model::records::row::Row;
use planner::query::ast::select::QueryDescriptor;
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::info;

/// A table kept in a JSON file. Reads and deletes run against an in-memory
/// copy; `flush` writes it back.
#[derive(Debug)]
pub struct FileTableStore {
    path: PathBuf,
    table: MemoryTableStore,
    dirty: AtomicBool,
}

impl FileTableStore {
    pub async fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let memory = match TableSnapshot::load(&path).await? {
            Some(snapshot) if snapshot.table == table => {
                info!(path = %path.display(), rows = snapshot.rows.len(), "Loaded table snapshot");
                MemoryTableStore::with_rows(table, snapshot.rows)
            }
            Some(snapshot) => {
                return Err(StoreError::Unreachable(format!(
                    "{} holds table '{}', not '{table}'",
                    path.display(),
                    snapshot.table
                )));
            }
            None => MemoryTableStore::new(table),
        };

        Ok(Self {
            path,
            table: memory,
            dirty: AtomicBool::new(false),
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.table = self.table.with_page_size(page_size);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn insert(&self, row: Row) -> bool {
        self.dirty.store(true, Ordering::Relaxed);
        self.table.insert(row).await
    }

    pub async fn rows(&self) -> Vec<Row> {
        self.table.rows().await
    }
}

#[async_trait]
impl TableStore for FileTableStore {
    fn table_name(&self) -> &str {
        self.table.table_name()
    }

    async fn ensure_table_exists(&self, name: &str) -> Result<(), StoreError> {
        if !self.table.exists().await {
            self.dirty.store(true, Ordering::Relaxed);
        }
        self.table.ensure_table_exists(name).await
    }

    async fn query_by_partition_key_range(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Page, StoreError> {
        self.table.query_by_partition_key_range(query).await
    }

    async fn next_page(&self, token: &ContinuationToken) -> Result<Page, StoreError> {
        self.table.next_page(token).await
    }

    async fn query_oldest_partition_key(&self) -> Result<Option<String>, StoreError> {
        self.table.query_oldest_partition_key().await
    }

    async fn execute_delete_batch(
        &self,
        partition_key: &str,
        row_keys: &[String],
    ) -> Result<(), StoreError> {
        self.table
            .execute_delete_batch(partition_key, row_keys)
            .await?;
        self.dirty.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        if !self.dirty.swap(false, Ordering::AcqRel) || !self.table.exists().await {
            return Ok(());
        }

        let snapshot = TableSnapshot {
            table: self.table.table_name().to_string(),
            rows: self.table.rows().await,
        };
        if let Err(err) = snapshot.save(&self.path).await {
            self.dirty.store(true, Ordering::Relaxed);
            return Err(err);
        }
        info!(path = %self.path.display(), rows = snapshot.rows.len(), "Flushed table snapshot");
        Ok(())
    }
}
