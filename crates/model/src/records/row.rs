use serde::{Deserialize, Serialize};

/// Key columns of a stored entity. Only these are fetched for a purge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Row {
    pub partition_key: String,
    pub row_key: String,
}

impl Row {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Row {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }
}
