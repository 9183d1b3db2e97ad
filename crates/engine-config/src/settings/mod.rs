use crate::settings::{
    error::SettingsError,
    split::{MAX_SPLITS, SplitPolicy},
    strategy::Strategy,
};
use engine_core::context::pipeline::DEFAULT_CHANNEL_CAPACITY;
use model::records::batch::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod error;
pub mod split;
pub mod strategy;

pub const DEFAULT_RETENTION_DAYS: u32 = 365;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Two workers per available core.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}

/// Everything that shapes a purge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeSettings {
    pub table_name: String,
    /// Rows older than this many days are deleted.
    pub retention_days: u32,
    pub worker_count: usize,
    pub strategy: Strategy,
    pub split: SplitPolicy,
    pub dry_run: bool,
    pub channel_capacity: usize,
    /// Capacity of the shared chunk queue in worker-pool mode.
    pub queue_capacity: usize,
    pub max_batch_size: usize,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            retention_days: DEFAULT_RETENTION_DAYS,
            worker_count: default_worker_count(),
            strategy: Strategy::default(),
            split: SplitPolicy::default(),
            dry_run: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl PurgeSettings {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.table_name.trim().is_empty() {
            return Err(SettingsError::MissingTableName);
        }

        let positive = [
            ("worker_count", self.worker_count),
            ("channel_capacity", self.channel_capacity),
            ("queue_capacity", self.queue_capacity),
            ("max_batch_size", self.max_batch_size),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(SettingsError::Zero { field });
        }

        if self.max_batch_size > MAX_BATCH_SIZE {
            return Err(SettingsError::BatchSizeTooLarge {
                size: self.max_batch_size,
                max: MAX_BATCH_SIZE,
            });
        }

        if self.worker_count > MAX_SPLITS {
            return Err(SettingsError::TooManySplits {
                field: "worker_count",
                value: self.worker_count,
                max: MAX_SPLITS,
            });
        }

        match self.split {
            SplitPolicy::Count(0) => {
                return Err(SettingsError::Zero {
                    field: "split count",
                });
            }
            SplitPolicy::Count(count) if count > MAX_SPLITS => {
                return Err(SettingsError::TooManySplits {
                    field: "split count",
                    value: count,
                    max: MAX_SPLITS,
                });
            }
            SplitPolicy::Every { seconds: 0 } => {
                return Err(SettingsError::Zero {
                    field: "split duration",
                });
            }
            _ => {}
        }

        // Fan-in runs one executor per sub-period.
        if self.strategy == Strategy::FanIn && self.split.needs_worker_pool() {
            return Err(SettingsError::SplitRequiresWorkerPool(self.split));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = PurgeSettings::new("events");
        assert_eq!(settings.retention_days, 365);
        assert_eq!(settings.worker_count % 2, 0);
        assert_eq!(settings.strategy, Strategy::FanIn);
        assert_eq!(settings.split, SplitPolicy::Workers);
        assert_eq!(settings.max_batch_size, 100);
        assert!(!settings.dry_run);
        settings.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = PurgeSettings::new("events");

        assert!(matches!(
            PurgeSettings::default().validate(),
            Err(SettingsError::MissingTableName)
        ));
        assert!(matches!(
            base.clone().with_worker_count(0).validate(),
            Err(SettingsError::Zero { field: "worker_count" })
        ));
        assert!(matches!(
            base.clone().with_queue_capacity(0).validate(),
            Err(SettingsError::Zero { field: "queue_capacity" })
        ));
        assert!(matches!(
            base.clone().with_max_batch_size(101).validate(),
            Err(SettingsError::BatchSizeTooLarge { size: 101, max: 100 })
        ));
        assert!(base.clone().with_split(SplitPolicy::Count(0)).validate().is_err());
        assert!(
            base.with_split(SplitPolicy::Every { seconds: 0 })
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_split_limits() {
        let pool = PurgeSettings::new("events").with_strategy(Strategy::WorkerPool);

        pool.clone().with_split(SplitPolicy::Count(MAX_SPLITS)).validate().unwrap();
        assert!(matches!(
            pool.clone().with_split(SplitPolicy::Count(MAX_SPLITS + 1)).validate(),
            Err(SettingsError::TooManySplits { field: "split count", .. })
        ));
        assert!(matches!(
            pool.clone().with_worker_count(MAX_SPLITS + 1).validate(),
            Err(SettingsError::TooManySplits { field: "worker_count", .. })
        ));
        pool.with_split(SplitPolicy::Every { seconds: 60 }).validate().unwrap();
    }

    #[test]
    fn test_fan_in_only_splits_by_workers() {
        let fan_in = PurgeSettings::new("events").with_strategy(Strategy::FanIn);
        fan_in.clone().validate().unwrap();

        for split in [SplitPolicy::Count(8), SplitPolicy::Every { seconds: 3600 }] {
            let err = fan_in.clone().with_split(split).validate().unwrap_err();
            assert!(
                matches!(err, SettingsError::SplitRequiresWorkerPool(policy) if policy == split),
                "{split}"
            );
        }
    }

    #[test]
    fn test_load_from_json_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"table_name":"events","strategy":"worker-pool","split":{{"every":{{"seconds":3600}}}},"dry_run":true}}"#
        )
        .unwrap();

        let settings = PurgeSettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.table_name, "events");
        assert_eq!(settings.strategy, Strategy::WorkerPool);
        assert_eq!(settings.split, SplitPolicy::Every { seconds: 3600 });
        assert!(settings.dry_run);
        assert_eq!(settings.retention_days, DEFAULT_RETENTION_DAYS);
        assert_eq!(settings.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("fan-in".parse::<Strategy>().unwrap(), Strategy::FanIn);
        assert_eq!("Worker-Pool".parse::<Strategy>().unwrap(), Strategy::WorkerPool);
        assert!(matches!(
            "round-robin".parse::<Strategy>(),
            Err(SettingsError::UnknownStrategy(_))
        ));
    }
}
