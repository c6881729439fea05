//! NFC tag payloads.
//!
//! The device forwards whatever JSON document it read from a tag, or a small
//! status object (`{"error": ...}` / `{"info": ...}`) while reading or writing.
//! `NfcPayload` keeps the raw document; `TagReading` is the classified view.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `payload` of an `nfcData` frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NfcPayload(Value);

/// Classified tag payload, in rendering priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagReading {
    /// Reader reported a failure.
    Error(String),
    /// Reader reported progress or a write outcome.
    Info(String),
    /// Nothing on the reader.
    Empty,
    Spool {
        id: String,
        brand: Option<String>,
        material: Option<String>,
    },
    Location {
        id: String,
    },
    /// A document that matches no known tag layout.
    Unrecognized,
}

impl NfcPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// True when the payload carries nothing: `null`, a falsy scalar, or `{}`.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map.is_empty(),
            other => field_text(other).is_none(),
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(field_text)
    }

    /// Classify the payload. Reader status text wins over any tag document,
    /// and a spool id wins over a location id.
    pub fn reading(&self) -> TagReading {
        if let Some(error) = self.field("error") {
            return TagReading::Error(error);
        }
        if let Some(info) = self.field("info") {
            return TagReading::Info(info);
        }
        if self.is_empty() {
            return TagReading::Empty;
        }
        if let Some(id) = self.field("sm_id") {
            return TagReading::Spool {
                id,
                brand: self.field("brand"),
                material: self.field("type"),
            };
        }
        if let Some(id) = self.field("location_id") {
            return TagReading::Location { id };
        }
        TagReading::Unrecognized
    }
}

impl From<Value> for NfcPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Render a field the way the device UI always has: falsy values (`null`,
/// `false`, `0`, `""`) count as absent, strings are shown verbatim.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reading(value: Value) -> TagReading {
        NfcPayload::new(value).reading()
    }

    #[test]
    fn empty_object_and_null_are_empty() {
        assert_eq!(reading(json!({})), TagReading::Empty);
        assert_eq!(reading(Value::Null), TagReading::Empty);
    }

    #[test]
    fn error_beats_info_and_spool_data() {
        let payload = json!({"error": "Read Error", "info": "Writing...", "sm_id": "A1"});
        assert_eq!(reading(payload), TagReading::Error("Read Error".into()));
    }

    #[test]
    fn info_beats_spool_data() {
        let payload = json!({"info": "Success", "sm_id": "A1"});
        assert_eq!(reading(payload), TagReading::Info("Success".into()));
    }

    #[test]
    fn blank_error_is_ignored() {
        let payload = json!({"error": "", "sm_id": "A1"});
        assert!(matches!(reading(payload), TagReading::Spool { .. }));
    }

    #[test]
    fn spool_fields_are_independent() {
        assert_eq!(
            reading(json!({"sm_id": "A1", "type": "PLA"})),
            TagReading::Spool {
                id: "A1".into(),
                brand: None,
                material: Some("PLA".into()),
            }
        );
    }

    #[test]
    fn numeric_spool_id_is_rendered() {
        assert_eq!(
            reading(json!({"sm_id": 17, "brand": "Acme"})),
            TagReading::Spool {
                id: "17".into(),
                brand: Some("Acme".into()),
                material: None,
            }
        );
    }

    #[test]
    fn spool_beats_location() {
        let payload = json!({"sm_id": "A1", "location_id": "L9"});
        assert!(matches!(reading(payload), TagReading::Spool { .. }));
    }

    #[test]
    fn location_tag() {
        assert_eq!(
            reading(json!({"location_id": "L9"})),
            TagReading::Location { id: "L9".into() }
        );
    }

    #[test]
    fn foreign_document_is_unrecognized() {
        assert_eq!(reading(json!({"uid": "04A2"})), TagReading::Unrecognized);
        assert_eq!(reading(json!("raw text")), TagReading::Unrecognized);
    }
}
