//! Point-in-time JSON copies of clinical records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use carechart_core::error::AppError;

/// A full JSON object holding every persisted field of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    /// Serialize a record into a snapshot. The record must serialize to a
    /// JSON object.
    pub fn capture<R: Serialize>(record: &R) -> Result<Self, AppError> {
        match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(other) => Err(AppError::internal(format!(
                "Record snapshot is not a JSON object: {other}"
            ))),
            Err(e) => Err(AppError::internal(format!("Failed to snapshot record: {e}"))),
        }
    }

    /// Rebuild a snapshot from a stored value. Non-object values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(Self)
    }

    /// Field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field names.
    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
