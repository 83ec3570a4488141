//! Retry loop: run one logical call until success, a terminal failure, or
//! the budget (attempts or request timeout) is spent.

use std::time::{Duration, Instant};

use super::classify::classify;
use super::error::UpstreamError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` sequentially until it succeeds or the policy says stop.
///
/// `f` receives the 1-based attempt number. On a retryable failure the
/// calling thread sleeps for the policy's fixed delay. If `request_timeout`
/// is set and sleeping would carry the call past it, the loop stops with
/// [`UpstreamError::DeadlineExceeded`].
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    request_timeout: Option<Duration>,
    mut f: F,
) -> Result<T, UpstreamError>
where
    F: FnMut(u32) -> Result<T, UpstreamError>,
{
    let started = Instant::now();
    let mut budget = policy.budget();
    loop {
        let attempt = budget.record_attempt();
        let err = match f(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        let kind = classify(&err);
        match policy.decide(&budget, kind) {
            RetryDecision::Propagate => return Err(err),
            RetryDecision::Exhausted => {
                tracing::warn!(attempt, "retry budget exhausted: {}", err);
                return Err(UpstreamError::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            RetryDecision::RetryAfter(delay) => {
                let elapsed = started.elapsed();
                if let Some(limit) = request_timeout {
                    if elapsed + delay > limit {
                        tracing::warn!(attempt, ?elapsed, "request timeout reached, giving up");
                        return Err(UpstreamError::DeadlineExceeded {
                            elapsed,
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                }
                tracing::warn!(
                    attempt,
                    ?kind,
                    delay_ms = delay.as_millis() as u64,
                    "retrying upstream call: {}",
                    err
                );
                std::thread::sleep(delay);
            }
        }
    }
}
