use crate::keys::partition_key::{ticks_from_time, time_from_ticks};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("Period end ({end}) is before its start ({start})")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Immutable time interval, half-open when used as a query range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::EndBeforeStart { start, end });
        }
        Ok(Period { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn ticks(&self) -> (i64, i64) {
        (ticks_from_time(self.start), ticks_from_time(self.end))
    }

    /// Splits the period into `count` contiguous sub-periods separated by
    /// one-tick gaps. The first starts at `start` and the last ends at `end`.
    ///
    /// A period spanning fewer than `count - 1` ticks yields one sub-period per
    /// tick boundary instead; an empty period yields nothing.
    pub fn split(&self, count: usize) -> Vec<Period> {
        let (start, end) = self.ticks();
        let total = end - start;
        if total <= 0 || count == 0 {
            return Vec::new();
        }

        let count = (count as u64).min(total as u64 + 1) as i64;
        let step = (total - (count - 1)) / count;

        let mut splits = Vec::with_capacity(count as usize);
        let mut s = start;
        for i in 1..=count {
            let e = if i == count { end } else { s + step };
            splits.push(self.sub_period(s, e));
            s = e + 1;
        }
        splits
    }

    /// Splits into `ceil(duration / every)` sub-periods of (almost) equal length.
    ///
    /// A non-positive `every` leaves the period whole.
    pub fn split_every(&self, every: Duration) -> Vec<Period> {
        self.split(self.count_every(every))
    }

    /// How many sub-periods [`Period::split_every`] would produce, without
    /// building them.
    pub fn count_every(&self, every: Duration) -> usize {
        if self.is_empty() {
            return 0;
        }

        let every_ticks = every
            .num_nanoseconds()
            .map(|n| n / 100)
            .unwrap_or(i64::MAX);
        if every_ticks <= 0 {
            return 1;
        }

        let (start, end) = self.ticks();
        let total = end - start;
        let count = total / every_ticks + i64::from(total % every_ticks != 0);
        usize::try_from(count.max(1)).unwrap_or(usize::MAX)
    }

    fn sub_period(&self, start_ticks: i64, end_ticks: i64) -> Period {
        // Boundaries were derived from this period's own ticks, so they convert back.
        let start = time_from_ticks(start_ticks).unwrap_or(self.start);
        let end = time_from_ticks(end_ticks).unwrap_or(self.end);
        Period { start, end }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}s)",
            self.start.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.end.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.duration().num_seconds()
        )
    }
}

pub fn log_periods(splits: &[Period]) {
    for (index, period) in splits.iter().enumerate() {
        tracing::info!(split = index, period = %period, "Sub-period");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tick() -> Duration {
        Duration::nanoseconds(100)
    }

    fn period(days: i64) -> Period {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        Period::new(start, start + Duration::days(days)).unwrap()
    }

    fn assert_contiguous(original: &Period, splits: &[Period]) {
        assert_eq!(splits.first().unwrap().start(), original.start());
        assert_eq!(splits.last().unwrap().end(), original.end());
        for pair in splits.windows(2) {
            assert!(pair[0].start() <= pair[0].end());
            assert_eq!(pair[1].start() - pair[0].end(), tick(), "gap must be one tick");
        }
    }

    #[test]
    fn test_new_rejects_inverted_period() {
        let p = period(1);
        assert!(Period::new(p.end(), p.start()).is_err());
        assert!(Period::new(p.start(), p.start()).is_ok());
    }

    #[test]
    fn test_split_by_count() {
        let p = period(1095);
        for n in [1, 2, 3, 7, 16, 64] {
            let splits = p.split(n);
            assert_eq!(splits.len(), n);
            assert_contiguous(&p, &splits);
        }
    }

    #[test]
    fn test_split_pieces_do_not_overlap() {
        let p = period(10);
        let splits = p.split(9);
        for (i, a) in splits.iter().enumerate() {
            for b in splits.iter().skip(i + 1) {
                assert!(a.end() < b.start());
            }
        }
    }

    #[test]
    fn test_split_empty_period_yields_nothing() {
        let p = period(0);
        assert!(p.split(8).is_empty());
        assert!(p.split_every(Duration::days(1)).is_empty());
    }

    #[test]
    fn test_split_tiny_period_never_inverts() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let p = Period::new(start, start + tick() * 3).unwrap();

        let splits = p.split(3);
        assert_eq!(splits.len(), 3);
        assert_contiguous(&p, &splits);

        let capped = p.split(10);
        assert_eq!(capped.len(), 4);
        assert_contiguous(&p, &capped);
    }

    #[test]
    fn test_split_every_duration() {
        let p = period(10);
        let splits = p.split_every(Duration::days(3));
        assert_eq!(splits.len(), 4);
        assert_contiguous(&p, &splits);

        assert_eq!(p.split_every(Duration::days(5)).len(), 2);
        assert_eq!(p.split_every(Duration::days(30)).len(), 1);
        assert_eq!(p.split_every(Duration::zero()), vec![p]);
    }

    #[test]
    fn test_count_every_matches_split_every() {
        let p = period(365);
        assert_eq!(p.count_every(Duration::days(7)), 53);
        assert_eq!(p.count_every(Duration::seconds(1)), 365 * 86_400);
        assert_eq!(p.count_every(Duration::zero()), 1);
        assert_eq!(period(0).count_every(Duration::days(1)), 0);
        assert_eq!(
            p.count_every(Duration::days(30)),
            p.split_every(Duration::days(30)).len()
        );
    }

    #[test]
    fn test_display() {
        let p = period(1);
        assert_eq!(
            p.to_string(),
            "2017-01-01T00:00:00Z -> 2017-01-02T00:00:00Z (86400s)"
        );
    }
}
