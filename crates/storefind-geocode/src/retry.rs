//! Fixed-interval retry around any [`Geocoder`].
//!
//! Free-tier geocoding quotas reset on the order of seconds, so the delay
//! between attempts is constant rather than exponential. The sleep is
//! injected so tests can run the loop without waiting.

use std::time::Duration;

use async_trait::async_trait;
use storefind_core::Coordinate;

use crate::client::Geocoder;
use crate::error::GeocodeError;

/// How many times to ask the provider, and how long to wait between asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Treated as at least 1.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(10))
    }
}

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Resolves `location`, retrying transient failures per `policy`.
///
/// | Outcome of attempt `n`           | Action                                 |
/// |----------------------------------|----------------------------------------|
/// | success                          | return the coordinate                  |
/// | final error                      | return it unchanged                    |
/// | transient, `n < max_attempts`    | sleep `backoff`, try again             |
/// | transient, `n == max_attempts`   | [`GeocodeError::RetriesExhausted`]     |
///
/// # Errors
///
/// Returns the first non-transient [`GeocodeError`], or
/// [`GeocodeError::RetriesExhausted`] wrapping the last transient one.
pub async fn resolve_with_retry(
    geocoder: &dyn Geocoder,
    location: &str,
    policy: RetryPolicy,
    sleeper: &dyn Sleep,
) -> Result<Coordinate, GeocodeError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match geocoder.resolve(location).await {
            Ok(coordinate) => return Ok(coordinate),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if attempt >= max_attempts => {
                tracing::error!(attempt, max_attempts, error = %err, "geocoding retries exhausted");
                return Err(GeocodeError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = policy.backoff.as_millis() as u64;
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "geocoder transient error, retrying after back-off"
                );
                sleeper.sleep(policy.backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays a fixed script of outcomes, one per call.
    struct ScriptedGeocoder {
        script: Mutex<VecDeque<Result<Coordinate, GeocodeError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGeocoder {
        fn new(script: Vec<Result<Coordinate, GeocodeError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn resolve(&self, _location: &str) -> Result<Coordinate, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("geocoder called more times than scripted")
        }
    }

    #[derive(Default)]
    struct RecordingSleep {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleep for RecordingSleep {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    fn rate_limited() -> GeocodeError {
        GeocodeError::Provider {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: "You have exceeded your rate-limit for this API.".to_string(),
            transient: true,
        }
    }

    fn columbia() -> Coordinate {
        Coordinate::new(34.0007, -81.0348).unwrap()
    }

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let geocoder = ScriptedGeocoder::new(vec![Ok(columbia())]);
        let sleeper = RecordingSleep::default();

        let result =
            resolve_with_retry(&geocoder, "Columbia, SC", RetryPolicy::default(), &sleeper).await;

        assert_eq!(result.unwrap(), columbia());
        assert_eq!(geocoder.calls(), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_backoffs() {
        let geocoder =
            ScriptedGeocoder::new(vec![Err(rate_limited()), Err(rate_limited()), Ok(columbia())]);
        let sleeper = RecordingSleep::default();

        let result =
            resolve_with_retry(&geocoder, "Columbia, SC", RetryPolicy::default(), &sleeper).await;

        assert_eq!(result.unwrap(), columbia());
        assert_eq!(geocoder.calls(), 3);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            [Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let geocoder = ScriptedGeocoder::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
        ]);
        let sleeper = RecordingSleep::default();

        let result =
            resolve_with_retry(&geocoder, "Columbia, SC", RetryPolicy::default(), &sleeper).await;

        match result {
            Err(GeocodeError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, GeocodeError::Provider { .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(geocoder.calls(), 3);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_final_errors() {
        let geocoder = ScriptedGeocoder::new(vec![Err(GeocodeError::Provider {
            status: "REQUEST_DENIED".to_string(),
            message: "The provided API key is invalid.".to_string(),
            transient: false,
        })]);
        let sleeper = RecordingSleep::default();

        let result =
            resolve_with_retry(&geocoder, "Columbia, SC", RetryPolicy::default(), &sleeper).await;

        assert!(matches!(result, Err(GeocodeError::Provider { transient: false, .. })));
        assert_eq!(geocoder.calls(), 1, "final errors must not be retried");
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_results_is_final() {
        let geocoder = ScriptedGeocoder::new(vec![Err(GeocodeError::NoResults {
            location: "atlantis".to_string(),
        })]);
        let sleeper = RecordingSleep::default();

        let result =
            resolve_with_retry(&geocoder, "atlantis", RetryPolicy::default(), &sleeper).await;

        assert!(matches!(result, Err(GeocodeError::NoResults { .. })));
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn single_attempt_policy_never_sleeps() {
        let geocoder = ScriptedGeocoder::new(vec![Err(rate_limited())]);
        let sleeper = RecordingSleep::default();

        let result = resolve_with_retry(
            &geocoder,
            "Columbia, SC",
            RetryPolicy::new(1, Duration::from_secs(10)),
            &sleeper,
        )
        .await;

        assert!(matches!(
            result,
            Err(GeocodeError::RetriesExhausted { attempts: 1, .. })
        ));
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[test]
    fn zero_attempts_is_raised_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
