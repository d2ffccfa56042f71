use crate::models::TimelineBucket;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use std::collections::BTreeMap;

/// Groups session start times into (date, hour) buckets, UTC.
///
/// The result is sparse: hours without sessions are left out. Use
/// [`fill_hours`] to get a continuous 0-23 axis for one day.
pub fn bucket_sessions(started: &[DateTime<Utc>]) -> Vec<TimelineBucket> {
    let mut counts: BTreeMap<(NaiveDate, u32), u64> = BTreeMap::new();
    for ts in started {
        *counts.entry((ts.date_naive(), ts.hour())).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((date, hour), count)| TimelineBucket { date, hour, count })
        .collect()
}

pub fn fill_hours(buckets: &[TimelineBucket], date: NaiveDate) -> [u64; 24] {
    let mut hours = [0u64; 24];
    for bucket in buckets.iter().filter(|b| b.date == date) {
        if let Some(slot) = hours.get_mut(bucket.hour as usize) {
            *slot += bucket.count;
        }
    }
    hours
}
