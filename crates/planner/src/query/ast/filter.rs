//! Row predicates over the partition key column.

use serde::{Deserialize, Serialize};

/// Key columns a query may project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    PartitionKey,
    RowKey,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::PartitionKey => "PartitionKey",
            Column::RowKey => "RowKey",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFilter {
    /// Every row with a non-empty partition key.
    NotEmpty,

    /// Partition keys in `[from, to)`, compared lexicographically.
    Range { from: String, to: String },
}

impl KeyFilter {
    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        KeyFilter::Range {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn matches(&self, partition_key: &str) -> bool {
        match self {
            KeyFilter::NotEmpty => !partition_key.is_empty(),
            KeyFilter::Range { from, to } => {
                partition_key >= from.as_str() && partition_key < to.as_str()
            }
        }
    }
}
