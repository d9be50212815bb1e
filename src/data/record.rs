use serde::Serialize;
use std::collections::BTreeMap;

use super::schema::{FieldKind, Schema};
use super::time::{TimeIndex, HOUR_MILLIS, MINUTE_MILLIS, SECOND_MILLIS};
use super::value::Value;

pub const HOUR: &str = "hour";
pub const MINUTE: &str = "minute";
pub const SECOND: &str = "second";

/// Fields that every record must carry to derive its timestamp
pub const MANDATORY_FIELDS: [&str; 3] = [HOUR, MINUTE, SECOND];

const FIELD_SEPARATOR: char = ';';
const PAIR_SEPARATOR: char = ':';

/// One decoded sensor frame.
///
/// On disk a record is a single line of `name:value` pairs separated by `;`.
/// Field order on disk is not significant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "BTreeMap<String, Value>")]
pub struct Record {
    fields: BTreeMap<String, Value>,
    timestamp: i64,
}

impl Record {
    /// Build a record from decoded field values, validating the time fields
    pub fn new(fields: BTreeMap<String, Value>) -> Result<Self, RecordError> {
        let timestamp = derive_timestamp(&fields)?;
        Ok(Self { fields, timestamp })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parse a stored line, typing each value by the schema
    pub fn parse(line: &str, schema: &Schema) -> Result<Self, RecordError> {
        let mut fields = BTreeMap::new();

        for pair in line.trim().split(FIELD_SEPARATOR) {
            let (name, raw) = pair
                .split_once(PAIR_SEPARATOR)
                .ok_or_else(|| RecordError::MalformedPair(pair.to_string()))?;
            let kind = schema
                .kind_of(name)
                .ok_or_else(|| RecordError::UnknownField(name.to_string()))?;
            fields.insert(name.to_string(), Value::parse(kind, name, raw)?);
        }

        Self::new(fields)
    }

    /// Milliseconds from midnight
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }

    pub fn time_index(&self) -> TimeIndex {
        TimeIndex::new(self.timestamp)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when the field exists and its text form equals `value`
    pub fn matches(&self, name: &str, value: &str) -> bool {
        self.fields
            .get(name)
            .map(|v| v.to_string() == value)
            .unwrap_or(false)
    }

    /// Render the requested fields present in this record as
    /// space-separated `name=value` pairs, in the order requested.
    pub fn render<S: AsRef<str>>(&self, fields: &[S]) -> String {
        fields
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.fields.get(name).map(|v| format!("{}={}", name, v))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in &self.fields {
            if !first {
                write!(f, "{}", FIELD_SEPARATOR)?;
            }
            write!(f, "{}{}{}", name, PAIR_SEPARATOR, value)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Record> for BTreeMap<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

fn derive_timestamp(fields: &BTreeMap<String, Value>) -> Result<i64, RecordError> {
    let int_field = |name: &str| -> Result<i64, RecordError> {
        match fields.get(name) {
            Some(Value::Int(v)) => Ok(*v as i64),
            Some(Value::Float(_)) => Err(RecordError::WrongKind {
                field: name.to_string(),
                expected: FieldKind::Int,
            }),
            None => Err(RecordError::MissingField(name.to_string())),
        }
    };

    let hour = int_field(HOUR)?;
    let minute = int_field(MINUTE)?;
    let second = fields
        .get(SECOND)
        .ok_or_else(|| RecordError::MissingField(SECOND.to_string()))?;
    let out_of_range = || RecordError::InvalidNumber {
        field: SECOND.to_string(),
        raw: second.to_string(),
    };

    let second_millis = match second {
        Value::Int(s) => *s as i64 * SECOND_MILLIS,
        Value::Float(s) if s.is_finite() => (*s as f64 * SECOND_MILLIS as f64).round() as i64,
        Value::Float(_) => return Err(out_of_range()),
    };

    // Float seconds saturate when cast, so the sum can still overflow
    hour.checked_mul(HOUR_MILLIS)
        .and_then(|h| minute.checked_mul(MINUTE_MILLIS).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(second_millis))
        .ok_or_else(out_of_range)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Record missing mandatory field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' must be {expected}")]
    WrongKind { field: String, expected: FieldKind },

    #[error("Field '{field}' has unparseable value '{raw}'")]
    InvalidNumber { field: String, raw: String },

    #[error("Field '{0}' is not in the schema")]
    UnknownField(String),

    #[error("Malformed field pair '{0}'")]
    MalformedPair(String),

    #[error("Unknown field kind '{0}'")]
    UnknownKind(String),

    #[error("Malformed field descriptor '{0}'")]
    MalformedFieldDef(String),
}
