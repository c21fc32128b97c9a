//! Error types for the station client

use serde_json::Value;
use thiserror::Error;

use crate::session::Role;

/// Generic text shown when the backend could not be reached.
pub const NETWORK_FAILURE_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// Errors produced by the gateway for a single backend call
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A call made with a stored token came back 401
    #[error("Session expired, please sign in again")]
    Unauthenticated,

    /// Non-2xx response; `body` is the backend's error body
    #[error("Server error {status}: {}", rejection_text(.status, .body))]
    Rejected { status: u16, body: Value },
}

impl ApiError {
    /// HTTP status of a rejection, if this error is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Unauthenticated => Some(401),
            _ => None,
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Backend rejections are surfaced verbatim; transport and decode failures
    /// collapse to a generic message.
    pub fn message(&self) -> String {
        match self {
            ApiError::Rejected { status, body } => describe_body(*status, body),
            ApiError::Unauthenticated => self.to_string(),
            ApiError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            ApiError::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }
}

fn rejection_text(status: &u16, body: &Value) -> String {
    describe_body(*status, body)
}

/// Pull a readable message out of a backend error body.
///
/// FastAPI puts it under `detail` (a string, or a list of validation issues);
/// other handlers use `message`.
pub fn describe_body(status: u16, body: &Value) -> String {
    match body {
        Value::Null => format!("Request failed with status {}", status),
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail") {
                return match detail {
                    Value::String(text) => text.clone(),
                    Value::Array(_) => {
                        serde_json::to_string_pretty(detail).unwrap_or_else(|_| detail.to_string())
                    }
                    other => other.to_string(),
                };
            }
            if let Some(Value::String(message)) = map.get("message") {
                return message.clone();
            }
            body.to_string()
        }
        other => other.to_string(),
    }
}

/// Errors from the persisted key/value storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client-side validation failure, raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level error for routes, the router and dashboards
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No session, or a session for another role
    #[error("Not signed in")]
    NotSignedIn,

    /// The owning view was torn down while the request was in flight
    #[error("Request cancelled")]
    Cancelled,

    /// An action needs a selected FIR and none is open
    #[error("No FIR selected")]
    NothingSelected,

    /// Sign-in succeeded at the HTTP level but no token came back
    #[error("Invalid {0} credentials.")]
    NoToken(Role),
}

impl ClientError {
    /// Text suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(err) => err.message(),
            other => other.to_string(),
        }
    }

    /// True when the session was invalidated by the backend.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Api(ApiError::Unauthenticated))
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
