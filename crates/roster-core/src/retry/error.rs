//! Failure taxonomy for upstream calls.

use std::time::Duration;

use super::classify::classify_http_status;
use super::policy::ErrorKind;
use crate::model::ErrorBody;

/// Error returned by [`crate::client::UpstreamClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Gateway-class status (502-504). Retried until the budget runs out.
    #[error("upstream returned HTTP {status} (transient): {message}")]
    Transient { status: u16, message: String },

    /// Any other error status. Never retried.
    #[error("upstream returned HTTP {status}: {message}")]
    Permanent { status: u16, message: String },

    /// No HTTP response was received (refused, DNS, timeout).
    #[error("transport failure: {0}")]
    Transport(#[source] curl::Error),

    /// A 2xx response whose body did not match the expected shape.
    #[error("could not decode HTTP {status} response body")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot address the employee resource.
    #[error("invalid upstream base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The base URL parses but does not speak HTTP.
    #[error("unsupported upstream url scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),

    /// The request body could not be built.
    #[error("could not encode request body")]
    Encode(#[source] serde_json::Error),

    /// Every allowed attempt failed with a retryable error.
    #[error("retries exhausted after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<UpstreamError>,
    },

    /// The overall request timeout would be exceeded by another attempt.
    #[error("request timeout exceeded after {attempts} attempts ({elapsed:?})")]
    DeadlineExceeded {
        elapsed: Duration,
        attempts: u32,
        #[source]
        last: Box<UpstreamError>,
    },
}

impl UpstreamError {
    /// Build the error for a non-2xx response. The message comes from the
    /// provider's error body when it parses, otherwise from the raw body.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) => {
                let raw = String::from_utf8_lossy(body).trim().to_string();
                if raw.is_empty() {
                    format!("HTTP {status}")
                } else {
                    raw
                }
            }
        };
        match classify_http_status(status) {
            ErrorKind::Transient(_) => UpstreamError::Transient { status, message },
            _ => UpstreamError::Permanent { status, message },
        }
    }

    /// HTTP status observed for this failure, looking through exhaustion
    /// wrappers to the last attempt.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Transient { status, .. }
            | UpstreamError::Permanent { status, .. }
            | UpstreamError::Decode { status, .. } => Some(*status),
            UpstreamError::RetryExhausted { last, .. }
            | UpstreamError::DeadlineExceeded { last, .. } => last.status(),
            UpstreamError::Transport(_)
            | UpstreamError::InvalidBaseUrl(_)
            | UpstreamError::UnsupportedScheme(_)
            | UpstreamError::Encode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Permanent { status: 404, .. })
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, UpstreamError::Permanent { status: 400..=499, .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, UpstreamError::RetryExhausted { .. })
    }
}
