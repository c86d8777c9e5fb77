//! Schemaless documents and snapshots.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::StoreError;
use crate::paths::DocumentPath;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub path: DocumentPath,
    pub fields: Fields,
}

impl Document {
    pub fn new(path: DocumentPath, fields: Fields) -> Self {
        Self {
            id: path.id().to_string(),
            path,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// `{id, ...fields}` - the flat record shape views consume.
    pub fn to_record(&self) -> Value {
        let mut record = self.fields.clone();
        record.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(record)
    }

    /// Decode into a typed model. The record's `id` is available to the model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.to_record())
            .map_err(|e| StoreError::malformed(self.path.as_str(), e))
    }
}

/// Full result set of a query at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|d| d.id.as_str())
    }

    /// Decode every document, skipping (and logging) the ones that do not fit `T`.
    pub fn decode_lossy<T: DeserializeOwned>(&self) -> Vec<T> {
        self.docs
            .iter()
            .filter_map(|doc| match doc.decode() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(path = %doc.path, error = %e, "Skipping malformed document");
                    None
                }
            })
            .collect()
    }
}

const SERVER_VALUE_KEY: &str = ".sv";

/// Placeholder replaced by the store with its own write time.
pub fn server_timestamp() -> Value {
    json!({ SERVER_VALUE_KEY: "timestamp" })
}

pub fn is_server_timestamp(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.len() == 1 && o.get(SERVER_VALUE_KEY) == Some(&json!("timestamp")))
}

/// Replace top-level server timestamp placeholders with `now`.
pub fn resolve_server_values(fields: &mut Fields, now: &str) {
    for value in fields.values_mut() {
        if is_server_timestamp(value) {
            *value = Value::String(now.to_string());
        }
    }
}

/// Turn a serializable struct into a field map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::malformed(
            "<new document>",
            format!("expected an object, got {other}"),
        )),
        Err(e) => Err(StoreError::malformed("<new document>", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths;

    #[test]
    fn test_record_carries_id() {
        let mut fields = Fields::new();
        fields.insert("caption".into(), json!("sunset"));
        let doc = Document::new(paths::post("abc").unwrap(), fields);

        assert_eq!(doc.to_record(), json!({"id": "abc", "caption": "sunset"}));
    }

    #[test]
    fn test_resolve_server_values() {
        let mut fields = Fields::new();
        fields.insert("timestamp".into(), server_timestamp());
        fields.insert("caption".into(), json!({".sv": "other"}));

        resolve_server_values(&mut fields, "2026-01-01T00:00:00.000000Z");

        assert_eq!(fields["timestamp"], json!("2026-01-01T00:00:00.000000Z"));
        assert_eq!(fields["caption"], json!({".sv": "other"}));
    }
}
