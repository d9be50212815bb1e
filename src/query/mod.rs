pub mod engine;
pub mod page;
pub mod session;
pub mod summary;

pub use engine::QueryEngine;
pub use page::{Page, PAGE_SIZE};
pub use session::{ReadCursor, SearchCursor};
pub use summary::AggregateStats;

use crate::data::RecordError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("No more data")]
    NoMoreData,

    #[error("No collection run found: summary is missing")]
    NotInitialized,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed record: {0}")]
    Record(#[from] RecordError),

    #[error("Unrecognized summary line '{0}'")]
    UnknownSummaryKey(String),

    #[error("Invalid summary value for '{key}': '{raw}'")]
    InvalidSummaryValue { key: String, raw: String },
}

impl QueryError {
    /// End of results; recoverable by starting a new session
    pub fn is_no_more_data(&self) -> bool {
        matches!(self, QueryError::NoMoreData)
    }
}
