use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of 100ns ticks between 0001-01-01T00:00:00Z and the Unix epoch.
pub const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

/// Ticks are 100ns units.
pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const NANOS_PER_TICK: i64 = 100;

/// Width of an encoded partition key.
pub const KEY_WIDTH: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Malformed partition key '{key}': expected {KEY_WIDTH} ASCII digits")]
    MalformedKey { key: String },

    #[error("Partition key '{key}' is outside the representable time range")]
    OutOfRange { key: String },
}

/// Fixed-width, zero-padded decimal encoding of a UTC instant in ticks.
///
/// Ordering of the string form matches ordering of the encoded instants, which
/// is what lets "older than" be pushed to the store as a key range.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Encodes an instant. Instants before 0001-01-01 clamp to the all-zero key.
    pub fn encode(ts: DateTime<Utc>) -> Self {
        Self::from_ticks(ticks_from_time(ts))
    }

    pub fn from_ticks(ticks: i64) -> Self {
        PartitionKey(format!("{:0width$}", ticks.max(0), width = KEY_WIDTH))
    }

    pub fn decode(&self) -> DateTime<Utc> {
        // Construction guarantees a valid tick count.
        time_from_ticks(self.ticks()).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn ticks(&self) -> i64 {
        self.0.parse().unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses and validates a raw key as returned by the store.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.len() != KEY_WIDTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::MalformedKey {
                key: raw.to_string(),
            });
        }

        let ticks: i64 = raw.parse().map_err(|_| KeyError::OutOfRange {
            key: raw.to_string(),
        })?;
        time_from_ticks(ticks).ok_or_else(|| KeyError::OutOfRange {
            key: raw.to_string(),
        })?;

        Ok(PartitionKey(raw.to_string()))
    }
}

/// Encodes `ts` straight to its string form.
pub fn encode(ts: DateTime<Utc>) -> PartitionKey {
    PartitionKey::encode(ts)
}

/// Decodes a raw store key back to the instant it encodes.
pub fn decode(raw: &str) -> Result<DateTime<Utc>, KeyError> {
    PartitionKey::parse(raw).map(|key| key.decode())
}

pub fn ticks_from_time(ts: DateTime<Utc>) -> i64 {
    let secs = ts.timestamp();
    let sub_ticks = i64::from(ts.timestamp_subsec_nanos()) / NANOS_PER_TICK;
    secs.saturating_mul(TICKS_PER_SECOND)
        .saturating_add(sub_ticks)
        .saturating_add(TICKS_AT_UNIX_EPOCH)
}

pub fn time_from_ticks(ticks: i64) -> Option<DateTime<Utc>> {
    let unix_ticks = ticks.checked_sub(TICKS_AT_UNIX_EPOCH)?;
    let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = unix_ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(secs, nanos as u32)
}

/// Drops precision finer than one tick.
pub fn truncate_to_tick(ts: DateTime<Utc>) -> DateTime<Utc> {
    time_from_ticks(ticks_from_time(ts)).unwrap_or(ts)
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartitionKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionKey::parse(s)
    }
}

impl TryFrom<String> for PartitionKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PartitionKey::parse(&value)
    }
}

impl From<PartitionKey> for String {
    fn from(key: PartitionKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PartitionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
