use thiserror::Error;

/// All errors coming from the table store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or opened.
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A batch exceeded the store's atomic mutation limit.
    #[error("Batch of {size} rows exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// A row named in a delete batch does not exist. The whole batch is rejected.
    #[error("Entity not found: ({partition_key}, {row_key})")]
    EntityNotFound {
        partition_key: String,
        row_key: String,
    },

    #[error("Invalid continuation token: {0}")]
    InvalidContinuation(String),

    /// Generic request failure reported by the store.
    #[error("Request failed: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
