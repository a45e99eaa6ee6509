//! Message contract between the control surface and the content script.
//!
//! Request: `{ "action": "insertReport", "text": "..." }`
//! Response: `{ "success": true | false }`
//!
//! The field names are part of the wire contract and must not change.

use serde::{Deserialize, Serialize};

use crate::error::{EchoError, Result};

/// The only action the content script answers.
pub const INSERT_REPORT_ACTION: &str = "insertReport";

/// A request sent to the content script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ContentRequest {
    /// Insert `text` into the page's editable target.
    #[serde(rename = "insertReport")]
    InsertReport { text: String },
}

impl ContentRequest {
    pub fn insert_report(text: impl Into<String>) -> Self {
        ContentRequest::InsertReport { text: text.into() }
    }

    /// Parse a request from an arbitrary message value.
    ///
    /// Returns `Ok(None)` when the message carries an action this side does
    /// not own, so the caller can stay silent instead of answering.
    pub fn from_value(value: &serde_json::Value) -> Result<Option<Self>> {
        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or_else(|| EchoError::Protocol("message has no action".to_string()))?;

        if action != INSERT_REPORT_ACTION {
            return Ok(None);
        }

        let request = serde_json::from_value(value.clone())?;
        Ok(Some(request))
    }

    pub fn text(&self) -> &str {
        match self {
            ContentRequest::InsertReport { text } => text,
        }
    }
}

/// The content script's answer to an `insertReport` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub success: bool,
}

impl ContentResponse {
    pub fn new(success: bool) -> Self {
        Self { success }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let req = ContentRequest::insert_report("Nodule 1");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"action": "insertReport", "text": "Nodule 1"}));
    }

    #[test]
    fn test_response_wire_format() {
        let value = serde_json::to_value(ContentResponse::new(false)).unwrap();
        assert_eq!(value, json!({"success": false}));
    }

    #[test]
    fn test_from_value_insert_report() {
        let msg = json!({"action": "insertReport", "text": "Report:\n"});
        let req = ContentRequest::from_value(&msg).unwrap().unwrap();
        assert_eq!(req.text(), "Report:\n");
    }

    #[test]
    fn test_from_value_foreign_action_is_ignored() {
        let msg = json!({"action": "ping"});
        assert!(ContentRequest::from_value(&msg).unwrap().is_none());
    }

    #[test]
    fn test_from_value_missing_action() {
        let err = ContentRequest::from_value(&json!({"text": "x"})).unwrap_err();
        assert!(matches!(err, EchoError::Protocol(_)));
    }

    #[test]
    fn test_from_value_missing_text() {
        let err = ContentRequest::from_value(&json!({"action": "insertReport"})).unwrap_err();
        assert!(matches!(err, EchoError::Serialization(_)));
    }

    #[test]
    fn test_unicode_text_survives() {
        let msg = json!({"action": "insertReport", "text": "結節 1: 右葉"});
        let req = ContentRequest::from_value(&msg).unwrap().unwrap();
        assert_eq!(req.text(), "結節 1: 右葉");
    }
}
