use crate::{
    error::StoreError, file::json::store::FileTableStore, memory::store::MemoryTableStore,
    table::TableStore,
};
use std::sync::Arc;

/// Location prefix selecting a process-local table.
pub const MEMORY_SCHEME: &str = "memory://";

pub enum Adapter {
    Memory(MemoryTableStore),
    File(FileTableStore),
}

impl Adapter {
    /// Opens the store at `location`: `memory://` for an empty in-process
    /// table, anything else is a path to a JSON table file.
    pub async fn open(location: &str, table: &str) -> Result<Self, StoreError> {
        if location.starts_with(MEMORY_SCHEME) {
            return Ok(Adapter::Memory(MemoryTableStore::new(table)));
        }
        let store = FileTableStore::open(location, table).await?;
        Ok(Adapter::File(store))
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        match self {
            Adapter::Memory(store) => Adapter::Memory(store.with_page_size(page_size)),
            Adapter::File(store) => Adapter::File(store.with_page_size(page_size)),
        }
    }

    pub fn into_store(self) -> Arc<dyn TableStore> {
        match self {
            Adapter::Memory(store) => Arc::new(store),
            Adapter::File(store) => Arc::new(store),
        }
    }
}
