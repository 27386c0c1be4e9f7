//! Normalized API error shape shared by the gateway, the query cache and the UI layer.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, time::Duration};
use thiserror::Error;

/// Error taxonomy for everything that can reach UI-facing state.
///
/// The first four codes originate on the server, the last four are produced
/// on the client. Codes the backend sends that are not part of the taxonomy
/// (`LOGIN_ERROR`, `TYPE_MISMATCH`, ...) are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    ValidationError,
    DataNotFound,
    DatabaseError,
    InternalServerError,
    NetworkError,
    TimeoutError,
    ParseError,
    UnknownError,
    Other(String),
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DataNotFound => "DATA_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ParseError => "PARSE_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::Other(code) => code,
        }
    }

    /// Whether the code was produced on the client side of the wire
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::TimeoutError | Self::ParseError | Self::UnknownError
        )
    }

    /// Best-effort code for an HTTP status when the body carries none
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationError,
            StatusCode::NOT_FOUND => Self::DataNotFound,
            s if s.is_server_error() => Self::InternalServerError,
            _ => Self::UnknownError,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "VALIDATION_ERROR" => Self::ValidationError,
            "DATA_NOT_FOUND" => Self::DataNotFound,
            "DATABASE_ERROR" => Self::DatabaseError,
            "INTERNAL_SERVER_ERROR" => Self::InternalServerError,
            "NETWORK_ERROR" => Self::NetworkError,
            "TIMEOUT_ERROR" => Self::TimeoutError,
            "PARSE_ERROR" => Self::ParseError,
            "UNKNOWN_ERROR" => Self::UnknownError,
            _ => Self::Other(code),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to validation messages, as sent by the backend
pub type ErrorDetails = BTreeMap<String, Vec<String>>;

/// Normalized error: `{message, code, status?, details?, timestamp?}` plus the raw body.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub message: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Raw response body, when one was received
    #[serde(skip)]
    pub data: Option<serde_json::Value>,
}

/// Lenient view of an error body; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    status: Option<u16>,
    details: Option<ErrorDetails>,
    timestamp: Option<String>,
}

impl ApiError {
    /// Create an error with only a code and a message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status: None,
            details: None,
            timestamp: None,
            data: None,
        }
    }

    /// Client-side validation failure carrying per-field messages
    pub fn validation(details: ErrorDetails) -> Self {
        let mut err = Self::new(ErrorCode::ValidationError, "Input validation failed");
        err.status = Some(StatusCode::BAD_REQUEST.as_u16());
        err.details = Some(details);
        err
    }

    /// Unknown client-side failure
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }

    /// Normalize a non-success HTTP response
    ///
    /// The message is taken from the body's `message` field when present,
    /// otherwise a transport-style message naming the status is used.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let data = serde_json::from_slice::<serde_json::Value>(body).ok();
        let parsed = data
            .as_ref()
            .and_then(|value| serde_json::from_value::<ErrorBody>(value.clone()).ok())
            .unwrap_or_default();

        Self {
            message: parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16())),
            code: parsed
                .code
                .map(ErrorCode::from)
                .unwrap_or_else(|| ErrorCode::from_status(status)),
            status: Some(parsed.status.unwrap_or(status.as_u16())),
            details: parsed.details,
            timestamp: parsed.timestamp,
            data,
        }
    }

    /// Normalize a transport-level failure (no usable response)
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::TimeoutError
        } else if err.is_decode() {
            ErrorCode::ParseError
        } else if err.is_connect() || err.is_request() || err.is_body() {
            ErrorCode::NetworkError
        } else {
            ErrorCode::UnknownError
        };

        let message = if code == ErrorCode::TimeoutError {
            format!("timeout of {}ms exceeded", timeout.as_millis())
        } else {
            err.to_string()
        };

        let mut normalized = Self::new(code, message);
        normalized.status = err.status().map(|s| s.as_u16());
        normalized
    }

    /// A successful response whose body could not be decoded
    pub fn parse(err: &serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ParseError,
            format!("Failed to parse response body: {err}"),
        )
    }

    /// Whether this is an authentication failure
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NetworkError | ErrorCode::TimeoutError | ErrorCode::InternalServerError
        )
    }

    /// Friendly text for display, falling back to the raw message
    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::ValidationError => "Please check your input.".to_string(),
            ErrorCode::DataNotFound => "The requested data could not be found.".to_string(),
            ErrorCode::DatabaseError => {
                "A database error occurred. Please try again shortly.".to_string()
            }
            ErrorCode::NetworkError => "Please check your network connection.".to_string(),
            ErrorCode::TimeoutError => "The request timed out. Please try again.".to_string(),
            ErrorCode::ParseError => "The server response could not be processed.".to_string(),
            ErrorCode::InternalServerError => {
                "An internal server error occurred. Please try again shortly.".to_string()
            }
            _ if !self.message.is_empty() => self.message.clone(),
            _ => "An unknown error occurred.".to_string(),
        }
    }

    /// Flatten `details` into `field: message` lines
    pub fn detail_lines(&self) -> Vec<String> {
        self.details
            .iter()
            .flatten()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}
