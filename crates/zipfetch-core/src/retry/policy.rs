use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP status codes, curl errors, or IO failures into these
/// kinds. The kind shapes the backoff delay and the log line; it never turns
/// a failure into a permanent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, body cut short, etc.).
    Connection,
    /// HTTP 5xx other than 503.
    Http5xx(u16),
    /// Local disk failure while writing the body.
    Storage,
    /// Anything else (4xx, protocol errors).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The attempt budget is spent.
    NoRetry,
    /// Re-enqueue; the next attempt may start after the given delay.
    RetryAfter(Duration),
}

/// Bounded attempts with capped exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts per descriptor (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Decide what happens after a failed attempt.
    ///
    /// `attempts_made` is 1-based (1 = the first attempt just failed).
    pub fn decide(&self, attempts_made: u32, kind: ErrorKind) -> RetryDecision {
        if attempts_made >= self.max_attempts.max(1) {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), one step further when throttled, capped.
        let step = match kind {
            ErrorKind::Throttled => attempts_made,
            _ => attempts_made.saturating_sub(1),
        };
        let exp = 1u32 << step.min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(p: &RetryPolicy, attempt: u32, kind: ErrorKind) -> Duration {
        match p.decide(attempt, kind) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry at attempt {}", attempt),
        }
    }

    #[test]
    fn client_errors_are_still_retried() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Other),
            RetryDecision::RetryAfter(_)
        ));
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 20;
        let d1 = delay(&p, 1, ErrorKind::Timeout);
        let d2 = delay(&p, 2, ErrorKind::Timeout);
        assert_eq!(d1, p.base_delay);
        assert_eq!(d2, p.base_delay * 2);
        assert_eq!(delay(&p, 15, ErrorKind::Timeout), p.max_delay);
    }

    #[test]
    fn throttled_waits_longer() {
        let p = RetryPolicy::default();
        assert!(delay(&p, 1, ErrorKind::Throttled) > delay(&p, 1, ErrorKind::Http5xx(500)));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert!(matches!(p.decide(1, ErrorKind::Http5xx(500)), RetryDecision::RetryAfter(_)));
        assert!(matches!(p.decide(2, ErrorKind::Http5xx(500)), RetryDecision::RetryAfter(_)));
        assert_eq!(p.decide(3, ErrorKind::Http5xx(500)), RetryDecision::NoRetry);
    }

    #[test]
    fn single_attempt_never_retries() {
        let p = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(p.decide(1, ErrorKind::Connection), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_attempts_behaves_like_one() {
        let p = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(p.decide(1, ErrorKind::Connection), RetryDecision::NoRetry);
    }
}
