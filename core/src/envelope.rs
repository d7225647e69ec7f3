//! The normalized result every dispatcher operation returns.
//!
//! # Design
//! `Envelope` mirrors the backend wire shape `{success, result, message,
//! error}`. Decoding never rejects a well-formed JSON body on shape alone:
//! only a literal `"success": true` counts as success, so a missing,
//! `null`, `0` or otherwise false-y flag, or a body that is not an object at
//! all, reads as an application failure. `message` and `error` tolerate
//! non-string JSON (validation errors often arrive as objects) by rendering
//! it as compact JSON text. On a failure, a `result` that does not fit `T`
//! is dropped; on a success it is a decode error.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    pub pages: u64,
    #[serde(alias = "count")]
    pub total: u64,
    #[serde(default)]
    pub prev: Option<u64>,
    #[serde(default)]
    pub next: Option<u64>,
}

impl<T> Envelope<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            message: None,
            error: None,
            pagination: None,
        }
    }

    /// Transport-level failure. Never notifies, never panics.
    pub fn from_error(err: &RequestError) -> Self {
        Self {
            success: false,
            result: None,
            message: None,
            error: Some(err.to_string()),
            pagination: None,
        }
    }

    /// The result, only when the backend reported success.
    pub fn into_result(self) -> Option<T> {
        if self.success {
            self.result
        } else {
            None
        }
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Builds an envelope from any decoded JSON body.
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        let mut fields = match body {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        let success = fields.get("success") == Some(&Value::Bool(true));
        let result = match fields.remove("result") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value(raw) {
                Ok(result) => Some(result),
                Err(err) if success => return Err(err),
                Err(_) => None,
            },
        };
        let pagination = fields
            .remove("pagination")
            .and_then(|raw| serde_json::from_value(raw).ok());

        Ok(Self {
            success,
            result,
            message: fields.remove("message").and_then(text),
            error: fields.remove("error").and_then(text),
            pagination,
        })
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = Value::deserialize(deserializer)?;
        Self::from_value(body).map_err(D::Error::custom)
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
