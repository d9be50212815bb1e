use serde::Serialize;

use crate::data::Record;

/// Maximum number of records returned by one read call
pub const PAGE_SIZE: usize = 10;

/// One batch of records from a read session, rendered with the fields the
/// session asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    records: Vec<Record>,
    fields: Vec<String>,
}

impl Page {
    pub fn new(records: Vec<Record>, fields: Vec<String>) -> Self {
        Self { records, fields }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rendered line per record
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(|r| r.render(&self.fields)).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl IntoIterator for Page {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
