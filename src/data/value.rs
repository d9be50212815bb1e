use serde::Serialize;
use std::cmp::Ordering;

use super::record::RecordError;
use super::schema::FieldKind;

/// Numeric value carried by a sensor field
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i32),
    Float(f32),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v as f64,
        }
    }

    /// Parse the text form of a value of the given kind
    pub fn parse(kind: FieldKind, field: &str, raw: &str) -> Result<Self, RecordError> {
        let invalid = || RecordError::InvalidNumber {
            field: field.to_string(),
            raw: raw.to_string(),
        };
        match kind {
            FieldKind::Int => raw.trim().parse::<i32>().map(Value::Int).map_err(|_| invalid()),
            FieldKind::Float => raw.trim().parse::<f32>().map(Value::Float).map_err(|_| invalid()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Whole floats keep a fractional digit so they never read as integers
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Int(15).to_string(), "15");
        assert_eq!(Value::Float(20.0).to_string(), "20.0");
        assert_eq!(Value::Float(1.25).to_string(), "1.25");
        assert_eq!(Value::Float(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn test_parse_by_kind() {
        assert_eq!(Value::parse(FieldKind::Int, "hour", "7").unwrap(), Value::Int(7));
        assert_eq!(Value::parse(FieldKind::Float, "second", "1.5").unwrap(), Value::Float(1.5));
        assert_eq!(Value::parse(FieldKind::Float, "second", "3").unwrap(), Value::Float(3.0));

        assert!(matches!(
            Value::parse(FieldKind::Int, "hour", "7.5"),
            Err(RecordError::InvalidNumber { field, .. }) if field == "hour"
        ));
        assert!(Value::parse(FieldKind::Float, "temp", "warm").is_err());
    }

    #[test]
    fn test_float_text_round_trip() {
        for v in [0.1f32, 22.7, 1e-7, 123456.78, 3.0] {
            let text = Value::Float(v).to_string();
            assert_eq!(Value::parse(FieldKind::Float, "x", &text).unwrap(), Value::Float(v));
        }
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Float(1.5) > Value::Int(1));
    }
}
