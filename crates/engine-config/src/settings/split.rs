use crate::settings::error::SettingsError;
use chrono::TimeDelta;
use model::time::period::Period;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Upper bound on the number of sub-periods a window is cut into. Each one
/// spawns its own read pipeline.
pub const MAX_SPLITS: usize = 4096;

/// How the purge window is cut into sub-periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitPolicy {
    /// One sub-period per worker.
    #[default]
    Workers,

    /// A fixed number of sub-periods.
    Count(usize),

    /// Sub-periods no longer than the given number of seconds.
    Every { seconds: u64 },
}

impl SplitPolicy {
    /// Never yields more than [`MAX_SPLITS`] sub-periods. A duration that would
    /// need more is stretched to fit.
    pub fn split(&self, window: &Period, workers: usize) -> Vec<Period> {
        let count = match *self {
            SplitPolicy::Workers => workers,
            SplitPolicy::Count(count) => count,
            SplitPolicy::Every { seconds } => {
                let every = i64::try_from(seconds)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .unwrap_or(TimeDelta::MAX);
                window.count_every(every)
            }
        };
        window.split(count.min(MAX_SPLITS))
    }

    /// True when the number of sub-periods does not follow the worker count.
    pub fn needs_worker_pool(&self) -> bool {
        !matches!(self, SplitPolicy::Workers)
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPolicy::Workers => f.write_str("workers"),
            SplitPolicy::Count(count) => write!(f, "count:{count}"),
            SplitPolicy::Every { seconds } => write!(f, "every:{seconds}s"),
        }
    }
}

impl FromStr for SplitPolicy {
    type Err = SettingsError;

    /// Accepts `workers`, `count:<n>` or `every:<n>[s|m|h|d]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidSplit(s.to_string());
        let raw = s.trim().to_ascii_lowercase();

        if raw == "workers" {
            return Ok(SplitPolicy::Workers);
        }
        if let Some(count) = raw.strip_prefix("count:") {
            return count
                .parse()
                .map(SplitPolicy::Count)
                .map_err(|_| invalid());
        }
        if let Some(every) = raw.strip_prefix("every:") {
            let (digits, unit) = match every.find(|c: char| !c.is_ascii_digit()) {
                Some(idx) => every.split_at(idx),
                None => (every, "s"),
            };
            let value: u64 = digits.parse().map_err(|_| invalid())?;
            let factor = match unit {
                "s" => 1,
                "m" => 60,
                "h" => 3_600,
                "d" => 86_400,
                _ => return Err(invalid()),
            };
            let seconds = value.checked_mul(factor).ok_or_else(invalid)?;
            return Ok(SplitPolicy::Every { seconds });
        }

        Err(invalid())
    }
}
