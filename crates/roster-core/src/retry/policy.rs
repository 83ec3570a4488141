use std::time::Duration;

/// Classification of a failed attempt for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or transfer timeout before a complete response.
    Timeout,
    /// Network-level failure (refused, reset, DNS) before any response.
    Connection,
    /// Gateway-class HTTP status (502, 503, 504).
    Transient(u16),
    /// Any other HTTP error status.
    Permanent(u16),
    /// Anything else: bad request construction, undecodable body, etc.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Transient(_)
        )
    }
}

/// Decision returned by the retry policy for one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Terminal failure; hand it to the caller as-is.
    Propagate,
    /// Retryable failure; wait this long, then try again.
    RetryAfter(Duration),
    /// Retryable failure but the budget is spent.
    Exhausted,
}

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Never below 1.
    max_attempts: u32,
    /// Constant wait between attempts.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fresh per-call budget.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget {
            attempts: 0,
            max_attempts: self.max_attempts,
            delay: self.delay,
        }
    }

    /// Decide what to do after a failed attempt recorded in `budget`.
    pub fn decide(&self, budget: &RetryBudget, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::Propagate;
        }
        if budget.is_exhausted() {
            return RetryDecision::Exhausted;
        }
        RetryDecision::RetryAfter(budget.delay)
    }
}

/// Attempts made so far within one logical call.
///
/// Invariant: `attempts <= max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
}

impl RetryBudget {
    /// Record the start of an attempt and return its 1-based number.
    /// Never counts past `max_attempts`.
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts - self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}
