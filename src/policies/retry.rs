//! # Retry policy for failed tasks.
//!
//! [`RetryPolicy`] controls both retry eligibility and the delay before a
//! task re-enters the queue. It is parameterized by:
//! - [`RetryPolicy::max_retries`] — how many retries a task may consume;
//! - [`RetryPolicy::initial_delay`] / [`RetryPolicy::max_delay`] — delay range;
//! - [`RetryPolicy::backoff_factor`] — multiplicative growth knob;
//! - [`RetryPolicy::retryable_errors`] — failure-description prefixes
//!   that qualify for retry.
//!
//! The delay for retry attempt `n` (1-indexed once a task has been
//! re-queued) is `initial_delay × backoff_factor × n`, clamped to
//! `max_delay`. This is a linear-in-attempt multiplicative backoff, not
//! classic exponential doubling; the formula is part of the engine's
//! compatibility contract and must not be "fixed".
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskpool::RetryPolicy;
//!
//! let policy = RetryPolicy {
//!     max_retries: 3,
//!     initial_delay: Duration::from_secs(1),
//!     max_delay: Duration::from_secs(10),
//!     backoff_factor: 2.0,
//!     retryable_errors: vec!["SMTP connect error".into()],
//! };
//!
//! // Attempt 0 — uses the initial delay
//! assert_eq!(policy.calculate_retry_delay(0), Duration::from_secs(1));
//!
//! // Attempt 2 — 1s × 2.0 × 2 = 4s
//! assert_eq!(policy.calculate_retry_delay(2), Duration::from_secs(4));
//!
//! // Attempt 100 — clamped at max_delay
//! assert_eq!(policy.calculate_retry_delay(100), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::error::TaskError;

/// Per-category retry policy.
///
/// Immutable once handed to the engine; updates go through
/// [`PolicyTable::set`](crate::PolicyTable::set), which replaces the
/// whole policy atomically.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries (not counting the first attempt).
    pub max_retries: u32,
    /// Delay before the first re-queue.
    pub initial_delay: Duration,
    /// Ceiling applied to every computed delay.
    pub max_delay: Duration,
    /// Multiplicative growth factor applied per attempt.
    pub backoff_factor: f64,
    /// Failure-description prefixes that qualify for retry.
    ///
    /// Matching is an exact, case-sensitive prefix match; empty entries
    /// are ignored.
    pub retryable_errors: Vec<String>,
}

impl Default for RetryPolicy {
    /// Returns the fallback policy used for categories without an
    /// explicit entry: 3 retries, 1s initial delay, 30s cap, factor 2.0,
    /// retrying SMTP connect, database connection, and timeout failures.
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            retryable_errors: vec![
                "SMTP connect error".to_string(),
                "database connection error".to_string(),
                "task timeout".to_string(),
            ],
        }
    }
}

impl RetryPolicy {
    /// Computes the backoff delay for the given attempt count.
    ///
    /// Attempt 0 returns [`RetryPolicy::initial_delay`] unchanged. For
    /// higher attempts the delay grows linearly,
    /// `initial_delay × backoff_factor × attempt_count`, and is clamped
    /// to [`RetryPolicy::max_delay`]. Non-finite or negative products
    /// (possible with pathological factors) also clamp to the maximum.
    pub fn calculate_retry_delay(&self, attempt_count: u32) -> Duration {
        if attempt_count == 0 {
            return self.initial_delay;
        }

        let secs =
            self.initial_delay.as_secs_f64() * self.backoff_factor * f64::from(attempt_count);
        if !secs.is_finite() || secs < 0.0 || secs > self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }

    /// Decides whether a failed attempt may be retried.
    ///
    /// Returns false once `attempt_count` has reached
    /// [`RetryPolicy::max_retries`], and always false for
    /// [`TaskError::UnregisteredCategory`]. Otherwise the failure's
    /// rendered description must start with one of the configured
    /// signatures — an exact prefix match, never a substring search.
    pub fn should_retry(&self, error: &TaskError, attempt_count: u32) -> bool {
        if attempt_count >= self.max_retries {
            return false;
        }
        if matches!(error, TaskError::UnregisteredCategory { .. }) {
            return false;
        }

        let message = error.to_string();
        self.retryable_errors
            .iter()
            .any(|sig| !sig.is_empty() && message.starts_with(sig.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskCategory;

    fn policy(signatures: &[&str]) -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            retryable_errors: signatures.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn attempt_zero_returns_initial_delay() {
        let p = policy(&[]);
        assert_eq!(p.calculate_retry_delay(0), Duration::from_secs(1));
    }

    #[test]
    fn delay_grows_linearly_with_attempt() {
        let p = policy(&[]);
        assert_eq!(p.calculate_retry_delay(1), Duration::from_secs(2));
        assert_eq!(p.calculate_retry_delay(2), Duration::from_secs(4));
        assert_eq!(p.calculate_retry_delay(3), Duration::from_secs(6));
    }

    #[test]
    fn delay_is_non_decreasing_and_capped() {
        let p = policy(&[]);
        let mut prev = Duration::ZERO;
        for attempt in 1..100 {
            let delay = p.calculate_retry_delay(attempt);
            assert!(delay >= prev, "attempt {attempt} shrank the delay");
            assert!(delay <= p.max_delay, "attempt {attempt} exceeded max");
            prev = delay;
        }
        assert_eq!(p.calculate_retry_delay(10_000), p.max_delay);
    }

    #[test]
    fn negative_factor_clamps_to_max() {
        let mut p = policy(&[]);
        p.backoff_factor = -1.0;
        assert_eq!(p.calculate_retry_delay(1), p.max_delay);
    }

    #[test]
    fn max_retries_cuts_off_regardless_of_signature() {
        let p = policy(&["SMTP connect error"]);
        let err = TaskError::handler("SMTP connect error: refused");
        assert!(p.should_retry(&err, 0));
        assert!(p.should_retry(&err, 2));
        assert!(!p.should_retry(&err, 3));
        assert!(!p.should_retry(&err, 10));
    }

    #[test]
    fn prefix_match_is_exact_not_substring() {
        let p = policy(&["SMTP connect error"]);

        let prefixed = TaskError::handler("SMTP connect error: send failed");
        assert!(p.should_retry(&prefixed, 0));

        // Contains the signature but does not start with it.
        let embedded = TaskError::handler("mailer: SMTP connect error downstream");
        assert!(!p.should_retry(&embedded, 0));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let p = policy(&["SMTP connect error"]);
        let lowered = TaskError::handler("smtp connect error: send failed");
        assert!(!p.should_retry(&lowered, 0));
    }

    #[test]
    fn empty_signatures_never_match() {
        let p = policy(&["", ""]);
        assert!(!p.should_retry(&TaskError::handler("anything"), 0));
    }

    #[test]
    fn unregistered_category_is_never_retried() {
        // Even a signature matching the rendered message must not win.
        let p = policy(&["no handler registered"]);
        let err = TaskError::UnregisteredCategory {
            category: TaskCategory::Image,
        };
        assert!(!p.should_retry(&err, 0));
    }

    #[test]
    fn timeout_retried_only_when_listed() {
        let err = TaskError::Timeout {
            timeout: Duration::from_secs(5),
        };
        assert!(policy(&["task timeout"]).should_retry(&err, 0));
        assert!(!policy(&["SMTP connect error"]).should_retry(&err, 0));
    }
}
