// crates/catalog-core/src/runtime/retry.rs
// ============================================================================
// Module: Bounded Retry
// Description: Exponential backoff around a fallible async action.
// Purpose: Keep retry policy independent of timers and the sync scheduler.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`with_bounded_retries`] runs an action up to `attempts` times. Every
//! failed attempt `n` (0-based), the final one included, is followed by
//! `pause(base_delay * 2^n)`; with the defaults that is 1 s, 2 s, then 4 s
//! before the sequence reports exhaustion. The pause is supplied by the
//! caller, so tests can record delays instead of sleeping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of attempts per retry sequence.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default delay after the first failure.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Attempt budget and backoff base for a retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first; zero is treated as one.
    pub attempts: u32,
    /// Delay after the first failure; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a retry policy.
    #[must_use]
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// Returns the pause that follows failed attempt `attempt` (0-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Every attempt of a retry sequence failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Attempts made.
    pub attempts: u32,
    /// Error returned by the final attempt.
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempts: {}", self.attempts, self.last_error)
    }
}

impl<E> std::error::Error for RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

// ============================================================================
// SECTION: Retry Loop
// ============================================================================

/// Runs `action` until it succeeds or the policy's attempts are spent.
///
/// `action` receives the 0-based attempt number.
///
/// # Errors
///
/// Returns [`RetryExhausted`] carrying the final error when every attempt
/// fails.
pub async fn with_bounded_retries<T, E, A, AF, P, PF>(
    policy: RetryPolicy,
    mut action: A,
    mut pause: P,
) -> Result<T, RetryExhausted<E>>
where
    A: FnMut(u32) -> AF,
    AF: Future<Output = Result<T, E>>,
    P: FnMut(Duration) -> PF,
    PF: Future<Output = ()>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        match action(attempt).await {
            Ok(value) => return Ok(value),
            Err(last_error) => {
                pause(policy.delay_after(attempt)).await;
                let made = attempt + 1;
                if made >= attempts {
                    return Err(RetryExhausted {
                        attempts: made,
                        last_error,
                    });
                }
                attempt = made;
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use std::future::ready;

    use super::*;

    #[test]
    fn delays_double_from_the_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(64), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let mut pauses = Vec::new();
        let mut calls = 0_u32;
        let result = with_bounded_retries(
            RetryPolicy::default(),
            |attempt| {
                calls += 1;
                ready(if attempt < 2 { Err("down") } else { Ok(attempt) })
            },
            |delay| {
                pauses.push(delay);
                ready(())
            },
        )
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls, 3);
        assert_eq!(pauses, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempts_and_last_error() {
        let mut pauses = Vec::new();
        let result: Result<(), _> = with_bounded_retries(
            RetryPolicy::default(),
            |attempt| ready(Err(attempt)),
            |delay| {
                pauses.push(delay);
                ready(())
            },
        )
        .await;
        assert_eq!(
            result,
            Err(RetryExhausted {
                attempts: 3,
                last_error: 2,
            })
        );
        assert_eq!(
            pauses,
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let mut calls = 0_u32;
        let mut pauses = Vec::new();
        let result: Result<(), _> = with_bounded_retries(
            RetryPolicy::new(0, Duration::from_secs(1)),
            |_| {
                calls += 1;
                ready(Err("down"))
            },
            |delay| {
                pauses.push(delay);
                ready(())
            },
        )
        .await;
        assert_eq!(calls, 1);
        assert_eq!(pauses, vec![Duration::from_secs(1)]);
        assert_eq!(result.map_err(|err| err.attempts), Err(1));
    }

    #[tokio::test]
    async fn first_success_never_pauses() {
        let mut paused = false;
        let result: Result<u8, RetryExhausted<&str>> = with_bounded_retries(
            RetryPolicy::default(),
            |_| ready(Ok(7)),
            |_| {
                paused = true;
                ready(())
            },
        )
        .await;
        assert_eq!(result, Ok(7));
        assert!(!paused);
    }
}
