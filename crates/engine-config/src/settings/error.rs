use crate::settings::split::SplitPolicy;
use thiserror::Error;

/// Errors raised when loading or validating purge settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Table name must not be empty")]
    MissingTableName,

    /// A count or capacity that must be positive was zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("Batch size {size} exceeds the store limit of {max}")]
    BatchSizeTooLarge { size: usize, max: usize },

    #[error("{field} {value} exceeds the limit of {max} sub-periods")]
    TooManySplits {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Split policy '{0}' requires the worker-pool strategy")]
    SplitRequiresWorkerPool(SplitPolicy),

    #[error("Unknown scheduling strategy '{0}' (expected 'fan-in' or 'worker-pool')")]
    UnknownStrategy(String),

    #[error("Invalid split policy '{0}' (expected 'workers', 'count:<n>' or 'every:<n>[s|m|h|d]')")]
    InvalidSplit(String),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
