//! Opaque session records as returned by the schedule API.
//!
//! The service owns the shape of a session. Records are kept as raw JSON so
//! downstream consumers can pick out whatever fields they understand.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;

/// One scheduled session (talk, workshop, break, ...).
///
/// Serializes transparently, so a `Vec<SessionRecord>` round-trips the
/// response body unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord(pub Value);

impl SessionRecord {
    pub fn new(value: Value) -> Self {
        SessionRecord(value)
    }

    /// Unwrap and return the raw JSON value.
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Look up a top-level string field, if the record is an object.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl Deref for SessionRecord {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Value> for SessionRecord {
    fn from(value: Value) -> Self {
        SessionRecord(value)
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_list_from_array() {
        let body = r#"[{"event_key":"abc","name":"Opening"},{"event_key":"def"}]"#;
        let records: Vec<SessionRecord> = serde_json::from_str(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].str_field("name"), Some("Opening"));
        assert_eq!(records[1].str_field("name"), None);
    }

    #[test]
    fn test_record_list_rejects_object_body() {
        let body = r#"{"error":"invalid key"}"#;
        let result: Result<Vec<SessionRecord>, _> = serde_json::from_str(body);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_is_transparent() {
        let record = SessionRecord::new(json!({"event_key": "abc"}));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"event_key":"abc"}"#);
        assert_eq!(record["event_key"], "abc");
    }

    #[test]
    fn test_non_object_records_are_kept() {
        let records: Vec<SessionRecord> = serde_json::from_str(r#"[1, "two", null]"#).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].str_field("name"), None);
        assert_eq!(records[2].clone().into_inner(), Value::Null);
    }
}
