//! Retry policy for upstream calls.
//!
//! Failures are classified into [`ErrorKind`]s, a fixed-delay [`RetryPolicy`]
//! decides whether another attempt is made, and [`run_with_retry`] drives the
//! sequential attempt loop. Only 502, 503 and 504 (plus timeouts and
//! connection failures) are retried; everything else propagates unchanged.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::UpstreamError;
pub use policy::{ErrorKind, RetryBudget, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
