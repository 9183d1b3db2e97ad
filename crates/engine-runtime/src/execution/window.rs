use crate::error::PurgeError;
use chrono::{DateTime, TimeDelta, Utc};
use model::{keys::partition_key::truncate_to_tick, time::period::Period};

/// Instant before which rows are due for deletion, at tick resolution.
pub fn retention_cutoff(retention_days: u32, now: DateTime<Utc>) -> Result<DateTime<Utc>, PurgeError> {
    TimeDelta::try_days(i64::from(retention_days))
        .and_then(|retention| now.checked_sub_signed(retention))
        .map(truncate_to_tick)
        .ok_or_else(|| {
            PurgeError::InvalidWindow(format!(
                "a retention of {retention_days} days reaches past the representable time range"
            ))
        })
}

/// The window `[oldest, cutoff)`, or `None` when nothing is old enough.
pub fn compute_window(
    oldest: DateTime<Utc>,
    retention_days: u32,
    now: DateTime<Utc>,
) -> Result<Option<Period>, PurgeError> {
    let cutoff = retention_cutoff(retention_days, now)?;
    if oldest >= cutoff {
        return Ok(None);
    }

    Period::new(oldest, cutoff)
        .map(Some)
        .map_err(|err| PurgeError::InvalidWindow(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_spans_oldest_to_cutoff() {
        let oldest = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let window = compute_window(oldest, 30, now()).unwrap().unwrap();

        assert_eq!(window.start(), oldest);
        assert_eq!(window.end(), now() - Duration::days(30));
    }

    #[test]
    fn test_nothing_old_enough() {
        let cutoff = now() - Duration::days(30);
        assert!(compute_window(cutoff, 30, now()).unwrap().is_none());
        assert!(
            compute_window(cutoff + Duration::seconds(1), 30, now())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_zero_retention_cuts_at_now() {
        let oldest = now() - Duration::days(1);
        let window = compute_window(oldest, 0, now()).unwrap().unwrap();
        assert_eq!(window.end(), now());
    }

    #[test]
    fn test_cutoff_is_tick_aligned() {
        let precise = now() + Duration::nanoseconds(123_456_789);
        let cutoff = retention_cutoff(1, precise).unwrap();
        assert_eq!(cutoff.timestamp_subsec_nanos() % 100, 0);
    }

    #[test]
    fn test_overflowing_retention() {
        assert!(matches!(
            retention_cutoff(u32::MAX, now()),
            Err(PurgeError::InvalidWindow(_))
        ));
    }
}
