//! Aggregate statistics for one collection run
//!
//! Written once to the summary file at the end of ingestion as four
//! `key=value` lines and read back verbatim by queries.

use serde::Serialize;

use super::QueryError;
use crate::data::{Schema, TimeIndex};

pub const KEY_COUNT: &str = "count";
pub const KEY_START: &str = "start";
pub const KEY_END: &str = "end";
pub const KEY_SCHEMA: &str = "schema";

/// Durable summary of a collection run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Number of records stored
    pub count: u64,
    /// Timestamp of the first record, ms from midnight
    pub start_timestamp: i64,
    /// Timestamp of the last stored record, ms from midnight
    pub end_timestamp: i64,
    pub schema: Schema,
}

impl AggregateStats {
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Account for one stored record
    pub fn observe(&mut self, timestamp: i64) {
        self.count += 1;
        self.end_timestamp = timestamp;
    }

    /// Apply one `key=value` summary line
    pub fn apply_line(&mut self, line: &str) -> Result<(), QueryError> {
        let (key, raw) = line
            .split_once('=')
            .ok_or_else(|| QueryError::UnknownSummaryKey(line.to_string()))?;

        let invalid = || QueryError::InvalidSummaryValue {
            key: key.to_string(),
            raw: raw.to_string(),
        };

        match key {
            KEY_COUNT => self.count = raw.trim().parse().map_err(|_| invalid())?,
            KEY_START => self.start_timestamp = raw.trim().parse().map_err(|_| invalid())?,
            KEY_END => self.end_timestamp = raw.trim().parse().map_err(|_| invalid())?,
            KEY_SCHEMA => self.schema = Schema::parse(raw)?,
            _ => return Err(QueryError::UnknownSummaryKey(line.to_string())),
        }
        Ok(())
    }

    /// Rebuild from summary file lines. Blank lines are ignored.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = Self::default();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            stats.apply_line(line)?;
        }
        Ok(stats)
    }

    /// Disk form written to the summary file
    pub fn to_summary_text(&self) -> String {
        format!(
            "{}={}\n{}={}\n{}={}\n{}={}",
            KEY_COUNT,
            self.count,
            KEY_START,
            self.start_timestamp,
            KEY_END,
            self.end_timestamp,
            KEY_SCHEMA,
            self.schema
        )
    }

    /// User-facing multi-section form
    pub fn render(&self) -> String {
        let fields: Vec<String> = self.schema.fields().iter().map(|f| f.render()).collect();
        format!(
            "records:\n{}\n\nstart_time:\n{}\n\nend_time:\n{}\n\nfields:\n{}\n",
            self.count,
            TimeIndex::new(self.start_timestamp),
            TimeIndex::new(self.end_timestamp),
            fields.join("\n")
        )
    }
}
