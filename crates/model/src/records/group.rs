use crate::records::row::Row;

/// Rows from a single page that share one partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionGroup {
    pub key: String,
    pub rows: Vec<Row>,
}

impl PartitionGroup {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
