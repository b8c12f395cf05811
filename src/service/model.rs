//! Models served by the CRUD service

use crate::database::Filter;
use crate::error::{Error, Result};
use crate::pagination::Keyed;
use crate::types::{JsonObject, JsonValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record type the CRUD service can bind, store and return
///
/// Every conversion has a default built on the model's serde form, so a
/// plain `#[derive(Serialize, Deserialize)]` struct with a [`Keyed`] impl is
/// a complete model. Override a conversion to hide fields, add computed
/// ones, or narrow queries.
pub trait Model: Keyed + Serialize + DeserializeOwned {
    /// Column holding the record key
    const KEY_COLUMN: &'static str = "key";

    /// Row to insert on create
    fn to_create(&self) -> Result<JsonObject> {
        to_object(self)
    }

    /// Row to write on update and patch
    fn to_update(&self) -> Result<JsonObject> {
        to_object(self)
    }

    /// Key of the row to delete
    fn to_delete(&self) -> String {
        self.key()
    }

    /// Filter for get and find: one equality condition per bound field, with
    /// the key compared in its text form
    fn to_query(&self) -> Result<Filter> {
        let mut filter = Filter::new();
        for (column, value) in to_object(self)? {
            if column == Self::KEY_COLUMN {
                filter = filter.text_eq(column, key_text(&value));
            } else {
                filter = filter.eq(column, value);
            }
        }
        Ok(filter)
    }

    /// Response body for this record
    fn to_result(&self) -> Result<JsonValue> {
        serde_json::to_value(self)
            .map_err(|e| Error::decode(format!("Failed to serialize record: {e}")))
    }
}

/// Serialize a model into a JSON object
pub fn to_object<M: Serialize + ?Sized>(model: &M) -> Result<JsonObject> {
    match serde_json::to_value(model)? {
        JsonValue::Object(object) => Ok(object),
        other => Err(Error::invalid_request(format!(
            "Model must serialize to an object, got {other}"
        ))),
    }
}

/// Text form of a key value, as it appears in a cursor
pub fn key_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Document
// ============================================================================

/// Schemaless model: any JSON object, keyed by its `key` field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub JsonObject);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// Set a field
    pub fn insert(&mut self, field: impl Into<String>, value: JsonValue) {
        self.0.insert(field.into(), value);
    }

    /// Get the underlying object
    pub fn into_inner(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for Document {
    fn from(object: JsonObject) -> Self {
        Self(object)
    }
}

impl Keyed for Document {
    fn key(&self) -> String {
        self.0
            .get(<Self as Model>::KEY_COLUMN)
            .map(key_text)
            .unwrap_or_default()
    }
}

impl Model for Document {
    fn to_create(&self) -> Result<JsonObject> {
        Ok(self.0.clone())
    }

    fn to_update(&self) -> Result<JsonObject> {
        Ok(self.0.clone())
    }

    fn to_result(&self) -> Result<JsonValue> {
        Ok(JsonValue::Object(self.0.clone()))
    }
}
