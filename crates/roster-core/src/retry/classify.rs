//! Map HTTP statuses and curl errors onto retry [`ErrorKind`]s.

use super::error::UpstreamError;
use super::policy::ErrorKind;

/// Classify a non-2xx HTTP status. Only 502-504 are transient.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        502..=504 => ErrorKind::Transient(status),
        _ => ErrorKind::Permanent(status),
    }
}

/// Classify a curl error raised before any HTTP response was received.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_send_error()
        || e.is_recv_error()
        || e.is_read_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an upstream failure for the retry loop.
pub fn classify(e: &UpstreamError) -> ErrorKind {
    match e {
        UpstreamError::Transient { status, .. } | UpstreamError::Permanent { status, .. } => {
            classify_http_status(*status)
        }
        UpstreamError::Transport(ce) => classify_curl_error(ce),
        UpstreamError::Decode { .. }
        | UpstreamError::InvalidBaseUrl(_)
        | UpstreamError::UnsupportedScheme(_)
        | UpstreamError::Encode(_)
        | UpstreamError::RetryExhausted { .. }
        | UpstreamError::DeadlineExceeded { .. } => ErrorKind::Other,
    }
}
