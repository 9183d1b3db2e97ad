use crate::records::row::Row;

/// Upper bound on entities in one atomic batch. Fixed by the store protocol.
pub const MAX_BATCH_SIZE: usize = 100;

/// A slice of one partition's rows, small enough for one atomic delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchChunk {
    pub partition_key: String,
    pub rows: Vec<Row>,
}

impl BatchChunk {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_keys(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.row_key.clone()).collect()
    }
}
