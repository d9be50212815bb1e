pub mod record;
pub mod schema;
pub mod time;
pub mod value;

pub use record::{Record, RecordError, HOUR, MANDATORY_FIELDS, MINUTE, SECOND};
pub use schema::{FieldDef, FieldKind, Schema};
pub use time::TimeIndex;
pub use value::Value;
