//! Row records
//!
//! A row is a fixed core (`id`, `created_at`) plus an open map of extra
//! fields. On disk the core and the extra fields sit side by side in one
//! flat JSON object.

use std::borrow::Cow;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FitDbError, Result};

use super::{Fields, Value, CREATED_AT_FIELD, ID_FIELD};

/// One record in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Unique identifier (UUID v4), generated at insert
    pub id: String,

    /// ISO-8601 UTC timestamp, generated at insert
    pub created_at: String,

    /// Every other field
    #[serde(flatten)]
    pub fields: Fields,
}

impl Row {
    /// Build a freshly inserted row
    ///
    /// Generated `id` and `created_at` always win over caller-supplied
    /// values of the same name.
    pub fn new(mut fields: Fields) -> Self {
        fields.remove(ID_FIELD);
        fields.remove(CREATED_AT_FIELD);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            fields,
        }
    }

    /// Look up a field by name, core fields included
    pub fn get(&self, field: &str) -> Option<Cow<'_, Value>> {
        match field {
            ID_FIELD => Some(Cow::Owned(Value::Text(self.id.clone()))),
            CREATED_AT_FIELD => Some(Cow::Owned(Value::Text(self.created_at.clone()))),
            _ => self.fields.get(field).map(Cow::Borrowed),
        }
    }

    /// Shallow merge: patch fields replace, everything else is kept
    pub fn overlay(&self, patch: &Fields) -> Result<Row> {
        let mut updated = self.clone();
        for (key, value) in patch {
            match key.as_str() {
                ID_FIELD => updated.id = core_text(key, value)?,
                CREATED_AT_FIELD => updated.created_at = core_text(key, value)?,
                _ => {
                    updated.fields.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(updated)
    }
}

fn core_text(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FitDbError::InvalidPayload(format!("`{}` must be a string, got {}", key, value)))
}
