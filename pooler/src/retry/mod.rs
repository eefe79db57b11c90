//! Bounded retries for administrative commands.
//!
//! [`retry_on_error`] runs an operation until it succeeds, the [`RetryPredicate`] rejects the
//! failure, or the [`Backoff`] runs out of attempts.

mod backoff;
mod policy;

use std::future::Future;

use tracing::{debug, warn};

use crate::error::PoolerResult;

pub use backoff::Backoff;
pub use policy::{RetryPredicate, pause_retry_predicate, retry_any_error, retry_not_ready};

/// Runs `operation` following `backoff`, retrying failures accepted by `predicate`.
///
/// The error of the last attempt is returned unchanged when the predicate rejects it. When the
/// attempt budget runs out, the last error is returned with the attempt count added to its
/// detail.
pub async fn retry_on_error<T, F, Fut, R>(
    backoff: &Backoff,
    predicate: &R,
    mut operation: F,
) -> PoolerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PoolerResult<T>>,
    R: RetryPredicate + ?Sized,
{
    let max_attempts = backoff.steps();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !predicate.should_retry(&err) {
            debug!(attempt, kind = ?err.kind(), "error is not retryable, giving up");
            return Err(err);
        }

        if attempt >= max_attempts {
            return Err(err.with_context(format!("gave up after {attempt} attempts")));
        }

        let delay = backoff.delay(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err.description(),
            detail = err.detail().unwrap_or_default(),
            "attempt failed, retrying"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
