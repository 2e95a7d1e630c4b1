//! Request and response descriptions exchanged with the search backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP status the backend returns for a completed request.
pub const STATUS_OK: u16 = 200;

/// Structured description of an outgoing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// HTTP method (e.g. `GET`, `POST`).
    pub method: String,
    /// Request path relative to the connection endpoint.
    pub path: String,
    /// Query string parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
    /// Name of the connection that issued the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl QueryRequest {
    /// Creates a request without parameters or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: BTreeMap::new(),
            body: Value::Null,
            connection: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// Creates a `POST` request with a body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new("POST", path).with_body(body)
    }

    /// Sets the body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Adds a query string parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Structured description of a backend response.
///
/// `status` is absent when the transport could not determine it; such a
/// response is still recorded but never counts as successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// HTTP status code.
    pub status: Option<u16>,
    /// Backend-reported processing time in milliseconds (`took`).
    pub elapsed: Option<u64>,
    /// Response body.
    #[serde(default)]
    pub body: Value,
}

impl QueryResponse {
    /// Creates a response with an explicit status and elapsed time.
    pub fn new(status: Option<u16>, elapsed: Option<u64>) -> Self {
        Self {
            status,
            elapsed,
            body: Value::Null,
        }
    }

    /// Creates a response from a status and JSON body, reading the elapsed
    /// time from the body's `took` field.
    pub fn from_body(status: u16, body: Value) -> Self {
        let elapsed = body.get("took").and_then(Value::as_u64);
        Self {
            status: Some(status),
            elapsed,
            body,
        }
    }

    /// Returns true for a completed, successful round-trip.
    pub fn is_success(&self) -> bool {
        self.status == Some(STATUS_OK)
    }
}
