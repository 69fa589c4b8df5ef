//! Error types for the coachboard API client.
//!
//! # Design
//! The backend reports failures as `{ timestamp?, code?, status?, errors? }`.
//! When a failed response carries that shape it is normalized into
//! `ApiError::Server` with a single human-readable message. Anything else is
//! passed through untouched in `ApiError::Http` so the caller still sees the
//! raw status and body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error body returned by the backend. Every field is optional
/// and typed loosely: a `timestamp` sent as epoch millis or a date array must
/// not hide the `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ServerError {
    /// Parse a response body as a backend error, if it is one.
    pub fn from_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Joined `errors` when non-empty, otherwise `status`.
    pub fn message(&self) -> Option<String> {
        match &self.errors {
            Some(errors) if !errors.is_empty() => Some(errors.join(", ")),
            _ => self
                .status
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Accepts `["a", "b"]` or a bare `"a"`. Non-string entries are dropped.
fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        serde_json::Value::String(s) => Some(vec![s]),
        _ => None,
    })
}

/// Errors returned by `ApiClient` and the services built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response with a recognized backend error body.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// Non-2xx response whose body is not a recognized error body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Streaming request answered with a non-2xx status.
    #[error("{message}")]
    Stream { status: u16, message: String },

    /// Streaming request answered OK but with no body to read.
    #[error("response body is empty (HTTP {status})")]
    EmptyStream { status: u16 },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The credential store could not be read or written.
    #[error("credential store failed: {0}")]
    Credentials(String),
}

impl ApiError {
    /// Normalize a failed response.
    pub fn from_response(status: u16, body: &str) -> Self {
        match ServerError::from_body(body) {
            Some(server) => match server.message() {
                Some(message) => ApiError::Server {
                    status,
                    code: server.code_string(),
                    message,
                },
                None => ApiError::Http {
                    status,
                    body: body.to_string(),
                },
            },
            None => ApiError::Http {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Normalize a failed streaming response: best-effort JSON message,
    /// otherwise the status text.
    pub fn from_stream_failure(status: u16, status_text: &str, body: &str) -> Self {
        let message = ServerError::from_body(body)
            .and_then(|e| e.message())
            .unwrap_or_else(|| status_text.to_string());
        ApiError::Stream { status, message }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. }
            | ApiError::Http { status, .. }
            | ApiError::Stream { status, .. }
            | ApiError::EmptyStream { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } | ApiError::Stream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
