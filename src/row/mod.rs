//! Row Module
//!
//! Open-schema records stored in tables.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Row                                          │
//! │ ┌──────────┬──────────────┬────────────────┐ │
//! │ │ id       │ created_at   │ fields (map)   │ │
//! │ │ (uuid)   │ (ISO-8601)   │ name → Value   │ │
//! │ └──────────┴──────────────┴────────────────┘ │
//! └──────────────────────────────────────────────┘
//! ```

mod record;
mod value;

use std::collections::BTreeMap;

pub use record::Row;
pub use value::Value;

/// Name of the generated identifier field
pub const ID_FIELD: &str = "id";

/// Name of the generated creation timestamp field
pub const CREATED_AT_FIELD: &str = "created_at";

/// Open field map: caller payloads, update patches, and row extensions
pub type Fields = BTreeMap<String, Value>;

/// Build a [`Fields`] map from `(name, value)` pairs
///
/// ```
/// use fitdb::row::{fields, Value};
///
/// let f = fields([("name", Value::from("Leg Day")), ("sets", Value::from(4))]);
/// assert_eq!(f.len(), 2);
/// ```
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Parse a JSON object into [`Fields`], rejecting nested values
pub fn fields_from_json(json: serde_json::Value) -> crate::Result<Fields> {
    match json {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, Value::try_from(v)?)))
            .collect(),
        other => Err(crate::FitDbError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
