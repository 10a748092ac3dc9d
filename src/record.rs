//! Record - the persisted unit of output
//!
//! A Record is the JSON object captured from one fetch attempt. Successful
//! fetches carry the decoded response body plus a `timestamp` stamped at
//! capture time; failures carry exactly `error` and `timestamp`.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One captured fetch result, serialized as a single JSON line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a success record from a decoded JSON object body.
    ///
    /// Stamps `timestamp` at call time; an existing `timestamp` key in the
    /// body is overwritten.
    pub fn success(body: Map<String, Value>) -> Self {
        let mut fields = body;
        fields.insert("timestamp".to_string(), Value::String(now_iso8601()));
        Self(fields)
    }

    /// Build an error record carrying exactly `error` and `timestamp`
    pub fn error(description: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(description.into()));
        fields.insert("timestamp".to_string(), Value::String(now_iso8601()));
        Self(fields)
    }

    /// Whether this record captured a failure
    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    /// The stamped capture time, if present as a string
    pub fn timestamp(&self) -> Option<&str> {
        self.0.get("timestamp").and_then(Value::as_str)
    }

    /// Access a field by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Current local time as an ISO-8601 (RFC 3339) string
fn now_iso8601() -> String {
    Local::now().to_rfc3339()
}
