//! Append-only bucket and summary files
//!
//! Each bucket is a text file `data.<index>` holding one record per line;
//! the run summary lives in `summary`. Appends never rewrite or truncate:
//! the first write creates the file, later writes add a newline followed by
//! the content.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::StorageError;

/// Summary file name
pub const SUMMARY_FILE_NAME: &str = "summary";

/// Bucket file name prefix (`data.0`, `data.1`, ...)
pub const DATA_FILE_PREFIX: &str = "data";

/// File-backed store for one collection run
#[derive(Debug, Clone)]
pub struct BucketStore {
    dir: PathBuf,
}

impl BucketStore {
    /// Open a store rooted at an existing directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(StorageError::NotFound(dir));
        }
        Ok(Self { dir })
    }

    pub fn data_file_name(index: usize) -> String {
        format!("{}.{}", DATA_FILE_PREFIX, index)
    }

    pub fn bucket_path(&self, index: usize) -> PathBuf {
        self.dir.join(Self::data_file_name(index))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE_NAME)
    }

    /// Append one serialized record to a bucket
    pub fn append_record(&self, line: &str, bucket_index: usize) -> Result<(), StorageError> {
        let path = self.bucket_path(bucket_index);
        tracing::debug!("Appending record to {}", path.display());
        append(&path, line)
    }

    /// Append the serialized run summary
    pub fn append_summary(&self, content: &str) -> Result<(), StorageError> {
        append(&self.summary_path(), content)
    }

    /// Lazily read the lines of a bucket. Fails with `NotFound` when the
    /// bucket was never written.
    pub fn read_bucket(&self, bucket_index: usize) -> Result<LineReader, StorageError> {
        LineReader::open(self.bucket_path(bucket_index))
    }

    /// Like `read_bucket`, but an absent bucket reads as empty
    pub fn read_bucket_or_empty(&self, bucket_index: usize) -> Result<LineReader, StorageError> {
        match self.read_bucket(bucket_index) {
            Err(StorageError::NotFound(path)) => {
                tracing::debug!("Bucket {} absent, treating as empty", path.display());
                Ok(LineReader::empty())
            }
            other => other,
        }
    }

    /// Lazily read the lines of the summary file
    pub fn read_summary(&self) -> Result<LineReader, StorageError> {
        LineReader::open(self.summary_path())
    }
}

/// Strip leading and trailing newlines so appends are separated by exactly one
fn sanitize_newlines(content: &str) -> &str {
    content.trim_matches(|c| c == '\n' || c == '\r')
}

fn append(path: &Path, content: &str) -> Result<(), StorageError> {
    let content = sanitize_newlines(content);
    let has_content = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if has_content {
        file.write_all(b"\n")?;
    }
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Finite, lazily evaluated sequence of lines from one file.
///
/// Each read call opens its own handle; the handle closes when the reader
/// is dropped or exhausted.
#[derive(Debug)]
pub struct LineReader {
    lines: Option<io::Lines<BufReader<File>>>,
}

impl LineReader {
    fn open(path: PathBuf) -> Result<Self, StorageError> {
        match File::open(&path) {
            Ok(file) => Ok(Self {
                lines: Some(BufReader::new(file).lines()),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(path)),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    pub fn empty() -> Self {
        Self { lines: None }
    }
}

impl Iterator for LineReader {
    type Item = Result<String, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        match lines.next() {
            Some(line) => Some(line.map_err(StorageError::Io)),
            None => {
                self.lines = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_all(reader: LineReader) -> Vec<String> {
        reader.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn test_append_creates_then_appends() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();

        store.append_record("hour:1;minute:0;second:0", 3).unwrap();
        store.append_record("hour:1;minute:0;second:1", 3).unwrap();

        let raw = fs::read_to_string(store.bucket_path(3)).unwrap();
        assert_eq!(raw, "hour:1;minute:0;second:0\nhour:1;minute:0;second:1");
        assert_eq!(read_all(store.read_bucket(3).unwrap()).len(), 2);
    }

    #[test]
    fn test_newline_sanitation() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();

        store.append_record("\n\nfirst\n", 0).unwrap();
        store.append_record("second\n\n", 0).unwrap();
        store.append_record("\nthird", 0).unwrap();

        let raw = fs::read_to_string(store.bucket_path(0)).unwrap();
        assert_eq!(raw, "first\nsecond\nthird");
        assert_eq!(read_all(store.read_bucket(0).unwrap()), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_missing_bucket_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();

        assert!(matches!(store.read_bucket(7), Err(StorageError::NotFound(_))));
        assert_eq!(store.read_bucket_or_empty(7).unwrap().count(), 0);
        assert!(!store.bucket_path(7).exists());
    }

    #[test]
    fn test_reader_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();
        store.append_record("a", 1).unwrap();
        store.append_record("b", 1).unwrap();

        let first = read_all(store.read_bucket(1).unwrap());
        let second = read_all(store.read_bucket(1).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_append_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();

        assert!(matches!(store.read_summary(), Err(StorageError::NotFound(_))));

        store.append_summary("count=2\nstart=0\nend=10\nschema=hour:integer\n").unwrap();
        let lines = read_all(store.read_summary().unwrap());
        assert_eq!(lines, vec!["count=2", "start=0", "end=10", "schema=hour:integer"]);
    }

    #[test]
    fn test_empty_bucket_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = BucketStore::open(temp_dir.path()).unwrap();
        File::create(store.bucket_path(2)).unwrap();

        assert_eq!(store.read_bucket(2).unwrap().count(), 0);

        store.append_record("only", 2).unwrap();
        assert_eq!(fs::read_to_string(store.bucket_path(2)).unwrap(), "only");
    }

    #[test]
    fn test_open_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(BucketStore::open(&missing), Err(StorageError::NotFound(_))));
    }
}
