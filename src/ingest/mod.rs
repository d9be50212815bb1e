//! Ingestion of sensor frames
//!
//! A `FrameSource` yields decoded frames (from TCP or memory); the `Ingestor`
//! turns them into records and partitions them into bucket files.

pub mod collector;
pub mod source;
pub mod tcp;
pub mod wire;

pub use collector::{IngestReport, Ingestor, DEFAULT_RECORD_WINDOW_MS};
pub use source::{Frame, FrameSource, VecSource};
pub use tcp::TcpFrameSource;

use crate::data::RecordError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Transport error: {0}")]
    Transport(std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed frame: {0}")]
    Record(#[from] RecordError),
}
