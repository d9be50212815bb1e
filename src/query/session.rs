//! Ephemeral per-process query sessions

use std::collections::VecDeque;

use crate::data::Record;

/// Resume point of a search session. `None` means no search is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCursor {
    last_match: Option<i64>,
}

impl SearchCursor {
    pub fn last_match(&self) -> Option<i64> {
        self.last_match
    }

    pub fn is_active(&self) -> bool {
        self.last_match.is_some()
    }

    pub fn advance(&mut self, timestamp: i64) {
        self.last_match = Some(timestamp);
    }

    /// Whether a record at `timestamp` may still be reported. Records at or
    /// before the last match are skipped.
    pub fn admits(&self, timestamp: i64) -> bool {
        self.last_match.map_or(true, |last| timestamp > last)
    }

    pub fn reset(&mut self) {
        self.last_match = None;
    }
}

/// Buffered records of an active read session
#[derive(Debug, Clone, Default)]
pub struct ReadCursor {
    pending: VecDeque<Record>,
    fields: Vec<String>,
}

impl ReadCursor {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            pending: VecDeque::new(),
            fields,
        }
    }

    pub fn push(&mut self, record: Record) {
        self.pending.push_back(record);
    }

    /// Dequeue up to `max` records in FIFO order
    pub fn take(&mut self, max: usize) -> Vec<Record> {
        let n = max.min(self.pending.len());
        self.pending.drain(..n).collect()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Value, HOUR, MINUTE, SECOND};

    fn record_at(second: i32) -> Record {
        Record::from_pairs([
            (HOUR, Value::Int(0)),
            (MINUTE, Value::Int(0)),
            (SECOND, Value::Int(second)),
        ])
        .unwrap()
    }

    #[test]
    fn test_search_cursor_admits_strictly_later() {
        let mut cursor = SearchCursor::default();
        assert!(cursor.admits(0));

        cursor.advance(5_000);
        assert!(cursor.is_active());
        assert!(!cursor.admits(4_000));
        assert!(!cursor.admits(5_000));
        assert!(cursor.admits(5_001));

        cursor.reset();
        assert!(!cursor.is_active());
        assert!(cursor.admits(0));
    }

    #[test]
    fn test_read_cursor_fifo() {
        let mut cursor = ReadCursor::new(vec!["second".to_string()]);
        for s in 0..5 {
            cursor.push(record_at(s));
        }

        let first = cursor.take(3);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].timestamp_millis(), 0);
        assert_eq!(first[2].timestamp_millis(), 2_000);

        let rest = cursor.take(3);
        assert_eq!(rest.len(), 2);
        assert!(cursor.is_empty());
        assert!(cursor.take(3).is_empty());
    }
}
