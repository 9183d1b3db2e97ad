use connectors::error::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Failed to fetch page {page} for {query}: {source}")]
    Fetch {
        query: String,
        page: u64,
        #[source]
        source: StoreError,
    },
}

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Failed to delete {rows} rows in partition '{partition_key}': {source}")]
    DeleteBatch {
        partition_key: String,
        rows: usize,
        #[source]
        source: StoreError,
    },
}
