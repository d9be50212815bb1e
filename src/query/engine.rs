//! Stateful query API over a stored collection run
//!
//! Three independent operations:
//! - `summary` reads the aggregate stats fresh on every call
//! - `search` walks buckets in time order and resumes after the last hit
//! - `read` buffers a time window once per session and hands it out in pages

use super::page::{Page, PAGE_SIZE};
use super::session::{ReadCursor, SearchCursor};
use super::summary::AggregateStats;
use super::QueryError;
use crate::data::{Record, Schema, TimeIndex};
use crate::storage::{BucketRange, BucketStore, Bucketer};

/// Query engine owning the search and read sessions of one process
#[derive(Debug)]
pub struct QueryEngine {
    store: BucketStore,
    bucketer: Bucketer,
    schema: Schema,
    search: SearchCursor,
    read: Option<ReadCursor>,
}

impl QueryEngine {
    /// Create an engine sharing the bucketer of the ingestion run
    pub fn new(store: BucketStore, bucketer: Bucketer, schema: Schema) -> Self {
        Self {
            store,
            bucketer,
            schema,
            search: SearchCursor::default(),
            read: None,
        }
    }

    /// Open a previously collected run. The bucket range is rebuilt from the
    /// summary start and the collection window.
    pub fn open(store: BucketStore, record_window_millis: i64) -> Result<Self, QueryError> {
        let stats = read_summary(&store).map_err(|e| match e {
            QueryError::Storage(crate::storage::StorageError::NotFound(_)) => {
                QueryError::NotInitialized
            }
            other => other,
        })?;
        let range = BucketRange::starting_at(stats.start_timestamp, record_window_millis);
        tracing::info!(
            "Opened run {}..{} with {} records",
            range.start_millis,
            range.end_millis,
            stats.count
        );
        Ok(Self::new(store, Bucketer::new(range), stats.schema))
    }

    pub fn bucketer(&self) -> &Bucketer {
        &self.bucketer
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Read the aggregate stats of the run
    pub fn summary(&self) -> Result<AggregateStats, QueryError> {
        read_summary(&self.store)
    }

    /// Find the next record whose `field` renders as `value`.
    ///
    /// The first call scans from bucket 0; later calls resume from the bucket
    /// of the previous hit and only consider strictly later timestamps, so a
    /// second record sharing the hit's millisecond is never reported. When no
    /// hit remains the session resets and `NoMoreData` is returned.
    pub fn search(&mut self, field: &str, value: &str) -> Result<TimeIndex, QueryError> {
        let start_bucket = match self.search.last_match() {
            Some(last) => self.bucketer.bucket_index(last),
            None => self.bucketer.first_bucket_index(),
        };

        for bucket in start_bucket..=self.bucketer.last_bucket_index() {
            tracing::debug!("Searching bucket {} for {}={}", bucket, field, value);
            for line in self.store.read_bucket_or_empty(bucket)? {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = Record::parse(&line, &self.schema)?;
                if self.search.admits(record.timestamp_millis()) && record.matches(field, value) {
                    self.search.advance(record.timestamp_millis());
                    return Ok(record.time_index());
                }
            }
        }

        self.end_search();
        Err(QueryError::NoMoreData)
    }

    /// Drop the search session; the next search starts from the beginning
    pub fn end_search(&mut self) {
        if self.search.is_active() {
            tracing::debug!("Search session ended");
        }
        self.search.reset();
    }

    /// Return the next page of records in `[start, end]`.
    ///
    /// The first call of a session collects every matching record into a
    /// buffer; each call then hands out up to `PAGE_SIZE` of them. Once the
    /// buffer is drained the next call ends the session with `NoMoreData`.
    /// While a session is active the window and fields of later calls are
    /// not re-applied.
    pub fn read<S: AsRef<str>>(
        &mut self,
        start: TimeIndex,
        end: TimeIndex,
        fields: &[S],
    ) -> Result<Page, QueryError> {
        if end < start {
            return Err(QueryError::NoMoreData);
        }

        if self.read.is_none() {
            let range = self.bucketer.range();
            let start = range.clamp(start.millis());
            let end = range.clamp(end.millis());
            let fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
            self.read = Some(self.fill(start, end, fields)?);
        }

        let cursor = match self.read.as_mut() {
            Some(cursor) => cursor,
            None => return Err(QueryError::NoMoreData),
        };

        let records = cursor.take(PAGE_SIZE);
        if records.is_empty() {
            self.end_read();
            return Err(QueryError::NoMoreData);
        }
        Ok(Page::new(records, cursor.fields().to_vec()))
    }

    /// Drop the read session and any undelivered records
    pub fn end_read(&mut self) {
        if let Some(cursor) = self.read.take() {
            tracing::debug!("Read session ended with {} records undelivered", cursor.remaining());
        }
    }

    /// Whether a read session is buffered
    pub fn is_reading(&self) -> bool {
        self.read.is_some()
    }

    fn fill(&self, start: i64, end: i64, fields: Vec<String>) -> Result<ReadCursor, QueryError> {
        let mut cursor = ReadCursor::new(fields);
        let first = self.bucketer.bucket_index(start);
        let last = self.bucketer.bucket_index(end);

        for bucket in first..=last {
            for line in self.store.read_bucket_or_empty(bucket)? {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = Record::parse(&line, &self.schema)?;
                let t = record.timestamp_millis();
                if t >= start && t <= end {
                    cursor.push(record);
                }
            }
        }

        tracing::debug!(
            "Read session buffered {} records from buckets {}..={}",
            cursor.remaining(),
            first,
            last
        );
        Ok(cursor)
    }
}

fn read_summary(store: &BucketStore) -> Result<AggregateStats, QueryError> {
    let lines = store.read_summary()?.collect::<Result<Vec<_>, _>>()?;
    AggregateStats::from_lines(lines)
}
