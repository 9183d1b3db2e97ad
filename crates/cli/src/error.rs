use connectors::error::StoreError;
use engine_config::settings::error::SettingsError;
use engine_runtime::error::PurgeError;
use model::{keys::partition_key::KeyError, time::period::PeriodError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Purge failed: {0}")]
    Purge(#[from] PurgeError),

    #[error("Invalid period: {0}")]
    Period(#[from] PeriodError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
