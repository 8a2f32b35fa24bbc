/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or response wait exceeded the configured timeout.
    Timeout,
    /// Network-level failure (refused, DNS, reset, TLS handshake).
    Connection,
    /// Response status was not acceptable.
    HttpStatus(u32),
    /// Local disk failure.
    Storage,
    /// Anything else (malformed URL, redirect limit, protocol errors).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up on this URL.
    NoRetry,
    /// Issue the request again immediately.
    Retry,
}

/// Retries timed-out requests a bounded number of times.
///
/// Every other kind of failure is permanent for the URL in question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_reattempts: u32,
}

impl RetryPolicy {
    pub fn new(max_reattempts: u32) -> Self {
        Self { max_reattempts }
    }

    /// Total attempts a persistently timing-out request receives.
    pub fn max_attempts(&self) -> u32 {
        self.max_reattempts.saturating_add(1)
    }

    /// `attempt` is 1-based (1 = first attempt).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if kind != ErrorKind::Timeout || attempt >= self.max_attempts() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::Retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_retry() {
        let p = RetryPolicy::new(3);
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::Retry);
        assert_eq!(p.decide(1, ErrorKind::Connection), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::HttpStatus(503)), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::Storage), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn respects_max_reattempts() {
        let p = RetryPolicy::new(2);
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::Retry);
        assert_eq!(p.decide(2, ErrorKind::Timeout), RetryDecision::Retry);
        assert_eq!(p.decide(3, ErrorKind::Timeout), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_reattempts_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::NoRetry);
    }
}
