//! Collection run driver
//!
//! Pulls frames from a source, partitions them into buckets and writes the
//! run summary once the stream ends or the record window closes.

use super::source::FrameSource;
use super::IngestError;
use crate::data::{Record, Schema};
use crate::query::AggregateStats;
use crate::storage::{BucketRange, BucketStore, Bucketer};

/// Default collection window: five minutes
pub const DEFAULT_RECORD_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Outcome of a completed collection run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub stats: AggregateStats,
    /// Range opened by the first record; `None` if no frame arrived
    pub range: Option<BucketRange>,
    /// True when a record past the window ended the run, false on end of stream
    pub stopped_by_window: bool,
}

impl IngestReport {
    /// Bucketer shared with the query side of the same process
    pub fn bucketer(&self) -> Option<Bucketer> {
        self.range.map(Bucketer::new)
    }
}

/// Drives one collection run into a bucket store
#[derive(Debug, Clone)]
pub struct Ingestor {
    store: BucketStore,
    schema: Schema,
    record_window_millis: i64,
}

impl Ingestor {
    pub fn new(store: BucketStore, schema: Schema) -> Self {
        Self {
            store,
            schema,
            record_window_millis: DEFAULT_RECORD_WINDOW_MS,
        }
    }

    pub fn with_record_window(mut self, record_window_millis: i64) -> Self {
        self.record_window_millis = record_window_millis.max(0);
        self
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    /// Consume frames until the source ends or a record falls past the
    /// window, then write the summary. Any transport, record or storage
    /// failure aborts the run without writing a summary.
    pub fn run<S: FrameSource + ?Sized>(&self, source: &mut S) -> Result<IngestReport, IngestError> {
        let mut stats = AggregateStats::empty(self.schema.clone());
        let mut bucketer: Option<Bucketer> = None;
        let mut stopped_by_window = false;

        tracing::info!(
            "Collection started, window {} ms, {} fields",
            self.record_window_millis,
            self.schema.len()
        );

        while let Some(frame) = source.next_frame().map_err(IngestError::Transport)? {
            let record = Record::new(frame)?;
            let timestamp = record.timestamp_millis();

            let current = match bucketer {
                Some(b) => b,
                None => {
                    let range = BucketRange::starting_at(timestamp, self.record_window_millis);
                    stats.start_timestamp = timestamp;
                    *bucketer.insert(Bucketer::new(range))
                }
            };

            if current.range().is_past(timestamp) {
                tracing::info!(
                    "Record at {} ms is past the window {}..{}, stopping",
                    timestamp,
                    current.range().start_millis,
                    current.range().end_millis
                );
                stopped_by_window = true;
                break;
            }

            let bucket = current.bucket_index(timestamp);
            tracing::trace!("{} -> bucket {}", record, bucket);
            self.store.append_record(&record.to_string(), bucket)?;
            stats.observe(timestamp);
        }

        self.store.append_summary(&stats.to_summary_text())?;
        tracing::info!(
            "Collection finished: {} records, {}..{} ms",
            stats.count,
            stats.start_timestamp,
            stats.end_timestamp
        );

        Ok(IngestReport {
            stats,
            range: bucketer.map(|b| b.range()),
            stopped_by_window,
        })
    }
}
