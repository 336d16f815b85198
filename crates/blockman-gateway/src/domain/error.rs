//! Gateway error types.
//!
//! `ApiError` is what a handler returns to the client: an HTTP status plus a
//! JSON body of the form `{"error": "...", ...extra}`. `GatewayError` covers
//! startup and serving failures that never reach a client.

use axum::http::StatusCode;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Error returned to API clients
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Error message, rendered under `"error"`
    pub message: String,
    /// Additional top-level fields (`details`, `abi_id`, ...)
    pub fields: Vec<(String, serde_json::Value)>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach an extra top-level field to the error body
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Attach a `details` field
    pub fn with_details(self, details: impl fmt::Display) -> Self {
        self.with_field("details", details.to_string())
    }

    /// Look up an extra field by name
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Body could not be read as the expected request shape
    pub fn invalid_request(details: impl fmt::Display) -> Self {
        Self::bad_request("Invalid request").with_details(details)
    }

    /// 404 with the given message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// No ABI stored under this id
    pub fn abi_not_found(abi_id: &str) -> Self {
        Self::not_found("ABI not found").with_field("abi_id", abi_id)
    }

    /// 500 with the given message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1 + self.fields.len()))?;
        map.serialize_entry("error", &self.message)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (not returned to clients)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
