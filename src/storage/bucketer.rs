//! Timestamp to bucket hashing
//!
//! Maps a record timestamp onto one of a fixed number of on-disk buckets,
//! derived from the time range observed at the start of a collection run.

use serde::Serialize;

/// Number of buckets a collection run is partitioned into
pub const BUCKET_COUNT: i64 = 10;

/// Time range covered by one collection run, in ms from midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketRange {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl BucketRange {
    /// Range opened by the first record of a run
    pub fn starting_at(start_millis: i64, record_window_millis: i64) -> Self {
        Self {
            start_millis,
            end_millis: start_millis.saturating_add(record_window_millis),
        }
    }

    /// Whether a timestamp falls after the end of the range
    pub fn is_past(&self, timestamp: i64) -> bool {
        timestamp > self.end_millis
    }

    /// Clamp a timestamp into the range
    pub fn clamp(&self, timestamp: i64) -> i64 {
        timestamp.max(self.start_millis).min(self.end_millis)
    }
}

/// Assigns timestamps to buckets within a fixed range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketer {
    range: BucketRange,
}

impl Bucketer {
    pub fn new(range: BucketRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> BucketRange {
        self.range
    }

    pub fn first_bucket_index(&self) -> usize {
        0
    }

    pub fn last_bucket_index(&self) -> usize {
        (BUCKET_COUNT - 1) as usize
    }

    /// Width of one bucket in ms. The `+ 1` keeps the interval positive and
    /// keeps `end` inside the last bucket.
    pub fn interval(&self) -> i64 {
        1 + (self.range.end_millis - self.range.start_millis) / BUCKET_COUNT
    }

    /// Bucket holding `timestamp`. Timestamps outside the range clamp to
    /// the first or last bucket.
    pub fn bucket_index(&self, timestamp: i64) -> usize {
        let index = timestamp.saturating_sub(self.range.start_millis) / self.interval();
        index.clamp(0, BUCKET_COUNT - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval() {
        let bucketer = Bucketer::new(BucketRange::starting_at(0, 300_000));
        assert_eq!(bucketer.interval(), 30_001);
        assert_eq!(bucketer.last_bucket_index(), 9);
    }

    #[test]
    fn test_range_maps_into_valid_buckets() {
        let range = BucketRange::starting_at(61_200_000, 300_000);
        let bucketer = Bucketer::new(range);

        let mut previous = 0;
        for t in (range.start_millis..=range.end_millis).step_by(997) {
            let index = bucketer.bucket_index(t);
            assert!(index <= bucketer.last_bucket_index());
            assert!(index >= previous, "bucket index must not decrease");
            previous = index;
        }
        assert_eq!(bucketer.bucket_index(range.start_millis), 0);
        assert_eq!(bucketer.bucket_index(range.end_millis), 9);
    }

    #[test]
    fn test_every_bucket_used_once() {
        // Window of 299_990 ms gives an interval of exactly 30_000 ms
        let bucketer = Bucketer::new(BucketRange::starting_at(0, 299_990));
        let indexes: Vec<usize> = (0..10).map(|i| bucketer.bucket_index(i * 30_000)).collect();
        assert_eq!(indexes, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_five_minute_window_shares_first_bucket() {
        // With the +1 interval, 0 ms and 30_000 ms share bucket 0
        let bucketer = Bucketer::new(BucketRange::starting_at(0, 300_000));
        let indexes: Vec<usize> = (0..10).map(|i| bucketer.bucket_index(i * 30_000)).collect();
        assert_eq!(indexes, vec![0, 0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_single_record_run() {
        let bucketer = Bucketer::new(BucketRange::starting_at(5_000, 0));
        assert_eq!(bucketer.interval(), 1);
        assert_eq!(bucketer.bucket_index(5_000), 0);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let bucketer = Bucketer::new(BucketRange::starting_at(10_000, 1_000));
        assert_eq!(bucketer.bucket_index(0), 0);
        assert_eq!(bucketer.bucket_index(1_000_000), 9);
    }

    #[test]
    fn test_range_clamp() {
        let range = BucketRange::starting_at(1_000, 500);
        assert_eq!(range.clamp(0), 1_000);
        assert_eq!(range.clamp(1_200), 1_200);
        assert_eq!(range.clamp(9_000), 1_500);
        assert!(!range.is_past(1_500));
        assert!(range.is_past(1_501));
    }

    #[test]
    fn test_huge_window_saturates() {
        let range = BucketRange::starting_at(1_000, i64::MAX);
        assert_eq!(range.end_millis, i64::MAX);

        let bucketer = Bucketer::new(range);
        assert_eq!(bucketer.bucket_index(1_000), 0);
        assert!(bucketer.bucket_index(i64::MAX) <= bucketer.last_bucket_index());
    }
}
