use crate::query::{
    ast::{
        filter::{Column, KeyFilter},
        select::QueryDescriptor,
    },
    builder::select::SelectBuilder,
};
use chrono::{DateTime, Utc};
use model::{keys::partition_key::PartitionKey, time::period::Period};

/// Builds the only two queries a purge ever issues.
pub struct QueryPlanGenerator;

impl QueryPlanGenerator {
    /// Rows whose partition key encodes an instant in `[start, end)`.
    /// Only the key columns are projected.
    pub fn for_period(period: &Period) -> QueryDescriptor {
        Self::for_range(period.start(), period.end())
    }

    /// One query per sub-period of a split window. Neighbouring sub-periods
    /// are a tick apart, so every query but the last runs up to the start of
    /// the next one and no tick of the window is left out.
    pub fn for_splits(splits: &[Period]) -> Vec<QueryDescriptor> {
        splits
            .iter()
            .enumerate()
            .map(|(index, period)| match splits.get(index + 1) {
                Some(next) => Self::for_range(period.start(), next.start()),
                None => Self::for_period(period),
            })
            .collect()
    }

    fn for_range(from: DateTime<Utc>, to: DateTime<Utc>) -> QueryDescriptor {
        let filter = KeyFilter::range(PartitionKey::encode(from), PartitionKey::encode(to));
        SelectBuilder::new(filter).keys().build()
    }

    /// At most one row, projected to its partition key. The store returns keys
    /// in ascending order, so the first row is the oldest.
    pub fn oldest_partition() -> QueryDescriptor {
        SelectBuilder::new(KeyFilter::NotEmpty)
            .column(Column::PartitionKey)
            .top(1)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_period_query_covers_encoded_range() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let period = Period::new(start, start + Duration::days(1)).unwrap();
        let query = QueryPlanGenerator::for_period(&period);

        assert_eq!(
            query.filter,
            KeyFilter::range("0636188256000000000", "0636189120000000000")
        );
        assert!(query.projects(Column::PartitionKey));
        assert!(query.projects(Column::RowKey));
        assert_eq!(query.top, None);
    }

    #[test]
    fn test_split_queries_leave_no_tick_uncovered() {
        let start = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let window = Period::new(start, start + Duration::days(30)).unwrap();
        let splits = window.split(3);
        let queries = QueryPlanGenerator::for_splits(&splits);
        assert_eq!(queries.len(), 3);

        let boundary = PartitionKey::encode(splits[0].end());
        assert!(queries[0].filter.matches(boundary.as_str()));
        assert!(!queries[1].filter.matches(boundary.as_str()));

        for pair in queries.windows(2) {
            let (KeyFilter::Range { to, .. }, KeyFilter::Range { from, .. }) =
                (&pair[0].filter, &pair[1].filter)
            else {
                panic!("expected range filters");
            };
            assert_eq!(to, from, "queries must be contiguous");
        }
        assert_eq!(
            queries[2].filter,
            KeyFilter::range(
                PartitionKey::encode(splits[2].start()),
                PartitionKey::encode(window.end())
            )
        );
    }

    #[test]
    fn test_oldest_partition_query() {
        let query = QueryPlanGenerator::oldest_partition();
        assert_eq!(query.top, Some(1));
        assert_eq!(query.select, vec![Column::PartitionKey]);
        assert_eq!(query.filter, KeyFilter::NotEmpty);
    }
}
