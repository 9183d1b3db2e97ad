use crate::settings::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How sub-period pipelines are scheduled onto batch executors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One executor per sub-period, outputs merged by fan-in.
    #[default]
    FanIn,

    /// All sub-periods feed one bounded queue drained by a fixed pool.
    WorkerPool,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FanIn => "fan-in",
            Strategy::WorkerPool => "worker-pool",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fan-in" | "fanin" => Ok(Strategy::FanIn),
            "worker-pool" | "pool" => Ok(Strategy::WorkerPool),
            other => Err(SettingsError::UnknownStrategy(other.to_string())),
        }
    }
}
