//!
//! # Client Error Handling
//!
//! This module defines `ApiError`, the single error type returned by every call the client
//! makes. It separates authorization failures, client-side (4xx) failures that carry the
//! backend's field-level messages, server (5xx) failures, transport failures and local
//! problems such as token persistence or configuration.
//!
//! `From` implementations for `reqwest::Error`, `serde_json::Error`, `std::io::Error` and
//! `validator::ValidationErrors` allow the `?` operator to be used throughout the crate.

use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

/// Field name -> messages, as returned by the backend for rejected input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Represents every failure the API client can surface to its callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The backend answered HTTP 401 and the session could not be recovered.
    Unauthorized(String),
    /// Any other 4xx answer. `fields` keeps per-field validation messages for display;
    /// `detail` is the backend's own `detail` string, if it sent one.
    Client {
        status: u16,
        message: String,
        detail: Option<String>,
        fields: FieldErrors,
    },
    /// A 5xx answer from the backend.
    Server { status: u16, message: String },
    /// The request never produced an HTTP response (connection refused, timeout, ...).
    Network(String),
    /// A response body did not have the expected shape.
    Decode(String),
    /// Reading or writing persisted credentials failed.
    Storage(String),
    /// The client configuration is invalid.
    Config(String),
}

impl ApiError {
    /// Builds the error for a non-success response from its status and raw body.
    ///
    /// Django REST framework reports errors either as `{"detail": "..."}` or as a map of
    /// field names to message lists. Both are recognised; anything else falls back to the
    /// canonical reason phrase of the status.
    pub fn from_response(status: StatusCode, body: &[u8]) -> ApiError {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let detail = parsed
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        let fields = parsed.as_ref().map(collect_field_errors).unwrap_or_default();

        let reason = status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string();

        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized(detail.unwrap_or(reason))
        } else if status.is_server_error() {
            ApiError::Server {
                status: status.as_u16(),
                message: detail.unwrap_or(reason),
            }
        } else {
            let message = detail
                .clone()
                .or_else(|| {
                    fields
                        .values()
                        .find_map(|messages| messages.first().cloned())
                })
                .unwrap_or(reason);
            ApiError::Client {
                status: status.as_u16(),
                message,
                detail,
                fields,
            }
        }
    }

    /// The HTTP status behind this error, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Messages the backend attached to `field`, empty when there are none.
    pub fn field_errors(&self, field: &str) -> &[String] {
        match self {
            ApiError::Client { fields, .. } => fields.get(field).map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// The backend's `detail` string, if it sent one. Field errors and locally filled in
    /// reason phrases are not details.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Client { detail, .. } => detail.as_deref(),
            ApiError::Unauthorized(message) | ApiError::Server { message, .. } => {
                let reason = StatusCode::from_u16(self.status()?)
                    .ok()?
                    .canonical_reason()
                    .unwrap_or("Unexpected response");
                if message == reason {
                    None
                } else {
                    Some(message)
                }
            }
            _ => None,
        }
    }

    /// The human readable message, without the category prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Network(msg)
            | ApiError::Decode(msg)
            | ApiError::Storage(msg)
            | ApiError::Config(msg) => msg,
            ApiError::Client { message, .. } | ApiError::Server { message, .. } => message,
        }
    }
}

fn collect_field_errors(body: &Value) -> FieldErrors {
    let mut fields = FieldErrors::new();
    let Some(object) = body.as_object() else {
        return fields;
    };
    for (name, value) in object {
        if name == "detail" {
            continue;
        }
        let messages: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        if !messages.is_empty() {
            fields.insert(name.clone(), messages);
        }
    }
    fields
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Client {
                status, message, ..
            } => write!(f, "Request rejected ({}): {}", status, message),
            ApiError::Server { status, message } => write!(f, "Server error ({}): {}", status, message),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            ApiError::Storage(msg) => write!(f, "Token storage error: {}", msg),
            ApiError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Transport failures become `Network`, body decoding failures become `Decode`.
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> ApiError {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> ApiError {
        ApiError::Decode(error.to_string())
    }
}

/// I/O only happens when reading or writing the token file.
impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> ApiError {
        ApiError::Storage(error.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(error: ValidationErrors) -> ApiError {
        ApiError::Config(error.to_string())
    }
}
