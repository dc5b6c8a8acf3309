//! Error types for the Hyperwallet client.
//!
//! # Design
//! Argument errors are raised locally before any request is built, so callers
//! can tell usage mistakes apart from failures reported by the server. Every
//! non-2xx response lands in `Api` with the raw status and body, plus the
//! decoded JSON payload when the body parses.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, HyperwalletError>;

/// Errors returned by the client and its facade operations.
#[derive(Debug)]
pub enum HyperwalletError {
    /// A required argument was missing or empty. No request was sent.
    Argument(String),

    /// The server answered with a non-2xx status.
    Api {
        status: u16,
        body: String,
        payload: Option<Value>,
    },

    /// The transport failed before a response was received.
    Connection(String),

    /// A URL template referenced a placeholder with no matching parameter.
    Template(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),
}

/// One entry of the `errors` array the API returns on failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
}

impl HyperwalletError {
    pub(crate) fn required(name: &str) -> Self {
        HyperwalletError::Argument(format!("{name} is required!"))
    }

    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            HyperwalletError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Decode the `errors` array of an `Api` payload. Empty for every other
    /// variant and for payloads that do not follow the API's error format.
    pub fn error_details(&self) -> Vec<ErrorDetail> {
        let Some(errors) = self.payload().and_then(|payload| payload.get("errors")) else {
            return Vec::new();
        };
        serde_json::from_value(errors.clone()).unwrap_or_default()
    }

    fn payload(&self) -> Option<&Value> {
        match self {
            HyperwalletError::Api { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for HyperwalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyperwalletError::Argument(msg) => write!(f, "{msg}"),
            HyperwalletError::Api { status, body, .. } => {
                write!(f, "HTTP {status}: {body}")
            }
            HyperwalletError::Connection(msg) => write!(f, "connection failed: {msg}"),
            HyperwalletError::Template(msg) => write!(f, "invalid URL template: {msg}"),
            HyperwalletError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            HyperwalletError::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for HyperwalletError {}

impl From<ureq::Error> for HyperwalletError {
    fn from(value: ureq::Error) -> Self {
        HyperwalletError::Connection(value.to_string())
    }
}
