//! Retrying invoker.
//!
//! Runs a producer until it succeeds or the attempt budget is spent. Every
//! attempt is raced against the configured timeout; a timed-out attempt is
//! handled exactly like a rejected one.

use super::error::{AttemptError, LoadError};
use super::key::ComponentKey;
use super::options::LoadOptions;
use super::producer::Producer;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::time::Instant;

/// Runs `producer` with the retry and timeout policy in `options`.
///
/// `attempts` is incremented once per attempt so callers can observe how
/// many times the producer was actually invoked.
pub(crate) async fn load_with_retry<T: Send + 'static>(
    key: &ComponentKey,
    producer: &dyn Producer<T>,
    options: &LoadOptions,
    attempts: &AtomicU32,
) -> Result<T, LoadError> {
    let max_attempts = options.max_attempts();
    let started = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        attempts.fetch_add(1, Ordering::Relaxed);

        let error = match tokio::time::timeout(options.timeout, producer.produce()).await {
            Ok(Ok(value)) => {
                tracing::debug!(
                    key = %key,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Component loaded"
                );
                return Ok(value);
            }
            Ok(Err(e)) => AttemptError::Producer(e),
            Err(_) => AttemptError::Timeout {
                timeout: options.timeout,
            },
        };

        if attempt >= max_attempts {
            tracing::warn!(
                key = %key,
                attempts = attempt,
                error = %error,
                "Component load exhausted all attempts"
            );
            return Err(LoadError::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        tracing::debug!(
            key = %key,
            attempt,
            remaining = max_attempts - attempt,
            delay_ms = options.retry_delay.as_millis() as u64,
            error = %error,
            "Component load attempt failed, retrying"
        );
        tokio::time::sleep(options.retry_delay).await;
    }
}
