use std::time::Duration;

/// What happened to one executed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub partition_key: String,
    pub chunk_size: usize,
    pub error: Option<String>,
    pub duration: Duration,
}

impl BatchOutcome {
    pub fn success(partition_key: impl Into<String>, chunk_size: usize, duration: Duration) -> Self {
        BatchOutcome {
            partition_key: partition_key.into(),
            chunk_size,
            error: None,
            duration,
        }
    }

    pub fn failure(
        partition_key: impl Into<String>,
        chunk_size: usize,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        BatchOutcome {
            partition_key: partition_key.into(),
            chunk_size,
            error: Some(error.into()),
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
