pub mod bucketer;
pub mod files;

pub use bucketer::{BucketRange, Bucketer, BUCKET_COUNT};
pub use files::{BucketStore, LineReader, DATA_FILE_PREFIX, SUMMARY_FILE_NAME};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
