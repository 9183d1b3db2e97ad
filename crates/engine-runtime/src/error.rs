use connectors::error::StoreError;
use engine_config::settings::error::SettingsError;
use model::{execution::result::PurgeResult, keys::partition_key::KeyError};
use thiserror::Error;

/// Errors returned by a purge run. Per-page and per-batch failures never
/// surface here; they are counted in the result.
#[derive(Debug, Error)]
pub enum PurgeError {
    /// The store was unreachable or the table could not be created.
    #[error("Setup failed: {source}")]
    Setup {
        #[from]
        source: StoreError,
    },

    /// The table holds no rows. Not a failure: `result` is the zero-effect
    /// summary of the run.
    #[error("No data found in table '{table}'")]
    NoDataFound {
        table: String,
        result: Box<PurgeResult>,
    },

    #[error("Oldest partition key is malformed: {0}")]
    MalformedOldestKey(#[from] KeyError),

    #[error("Invalid purge window: {0}")]
    InvalidWindow(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// A pipeline task panicked.
    #[error("Pipeline task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PurgeError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PurgeError::NoDataFound { .. })
    }

    /// The run summary carried by non-fatal errors.
    pub fn result(&self) -> Option<&PurgeResult> {
        match self {
            PurgeError::NoDataFound { result, .. } => Some(result),
            _ => None,
        }
    }
}
