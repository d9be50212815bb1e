//! Field schema shared by ingestion, storage and queries.

use serde::Serialize;

use super::record::RecordError;

/// Numeric kind of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[serde(rename = "integer")]
    Int,
    Float,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int => "integer",
            FieldKind::Float => "float",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw {
            "integer" => Ok(FieldKind::Int),
            "float" => Ok(FieldKind::Float),
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field descriptor: `name:kind[:unit]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.unit = if unit.is_empty() { None } else { Some(unit) };
        self
    }

    /// Parse a single `name:kind[:unit]` descriptor
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        match parts.as_slice() {
            [name, kind] if !name.is_empty() => Ok(Self::new(*name, FieldKind::parse(kind)?)),
            [name, kind, unit] if !name.is_empty() => {
                Ok(Self::new(*name, FieldKind::parse(kind)?).with_unit(*unit))
            }
            _ => Err(RecordError::MalformedFieldDef(raw.to_string())),
        }
    }

    /// User-facing form, e.g. `temperature (float) - celsius`
    pub fn render(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} ({}) - {}", self.name, self.kind, unit),
            None => format!("{} ({})", self.name, self.kind),
        }
    }
}

impl std::fmt::Display for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{}:{}:{}", self.name, self.kind, unit),
            None => write!(f, "{}:{}", self.name, self.kind),
        }
    }
}

/// Ordered list of field descriptors. Order matters for display and for the
/// wire layout of a frame; lookups go by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Parse `name:kind[:unit](;name:kind[:unit])*`
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let fields = raw
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(FieldDef::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|f| f.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.fields.iter().map(|d| d.to_string()).collect();
        f.write_str(&joined.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_with_units() {
        let schema = Schema::parse("hour:integer;minute:integer;second:float;temp:float:celsius").unwrap();

        assert_eq!(schema.len(), 4);
        assert_eq!(schema.kind_of("second"), Some(FieldKind::Float));
        assert_eq!(schema.get("temp").unwrap().unit.as_deref(), Some("celsius"));
        assert_eq!(schema.get("hour").unwrap().unit, None);
        assert!(!schema.contains("pressure"));
    }

    #[test]
    fn test_schema_display_matches_input() {
        let raw = "hour:integer;minute:integer;second:integer;rpm:integer:rev/min";
        assert_eq!(Schema::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(matches!(
            Schema::parse("hour:integer;name:string"),
            Err(RecordError::UnknownKind(k)) if k == "string"
        ));
    }

    #[test]
    fn test_malformed_descriptor_rejected() {
        assert!(matches!(
            FieldDef::parse("hour"),
            Err(RecordError::MalformedFieldDef(_))
        ));
        assert!(matches!(
            FieldDef::parse("a:integer:b:c"),
            Err(RecordError::MalformedFieldDef(_))
        ));
    }

    #[test]
    fn test_render_field() {
        let def = FieldDef::new("temp", FieldKind::Float).with_unit("celsius");
        assert_eq!(def.render(), "temp (float) - celsius");
        assert_eq!(FieldDef::new("hour", FieldKind::Int).render(), "hour (integer)");
    }
}
