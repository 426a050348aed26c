//! Error types for the task API client.
//!
//! # Design
//! `Unauthorized` gets a dedicated variant because the façade reacts to it
//! (credential clearing plus redirect) before re-throwing; every other
//! non-expected status lands in `Http` with the raw status code and body.
//! `Network` is constructed by the host when the transport itself fails (no
//! response at all) so that both failure classes flow through the same
//! display path, per the error taxonomy of the UI.
//!
//! `user_message` implements the banner-text extraction contract: prefer a
//! plain-string response body, then a `message` field, then a `details`
//! field, then the caller-supplied fallback. Errors that carry no response
//! body always yield the fallback.

use std::fmt;

use serde_json::Value;

/// Errors surfaced by `ApiClient` parse methods and fed to the controllers.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 401. The façade has already cleared the session
    /// and triggered the auth redirect by the time callers see this.
    Unauthorized { body: String },

    /// The server returned a non-expected status other than 401.
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The transport failed before any response arrived.
    Network(String),
}

impl ApiError {
    /// Extract the message to show the user, falling back to `fallback`.
    ///
    /// Mirrors what the UI does with a failed response: a plain-string body
    /// wins, then the body's `message` field, then its `details` field.
    pub fn user_message(&self, fallback: &str) -> String {
        let body = match self {
            ApiError::Unauthorized { body } => body,
            ApiError::Http { body, .. } => body,
            _ => return fallback.to_string(),
        };
        match serde_json::from_str::<Value>(body) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            Ok(Value::Object(fields)) => fields
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| fields.get("details").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            // Non-JSON bodies are servers answering in plain text.
            Err(_) if !body.trim().is_empty() => body.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized { body } => {
                write!(f, "unauthorized: {body}")
            }
            ApiError::Http { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::Network(msg) => {
                write!(f, "network error: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
