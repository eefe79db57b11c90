use config::shared::PauseRetryPolicy;

use crate::error::PoolerError;

/// Decides whether a failed attempt is worth another try.
pub trait RetryPredicate: Send + Sync {
    fn should_retry(&self, error: &PoolerError) -> bool;
}

impl<F> RetryPredicate for F
where
    F: Fn(&PoolerError) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &PoolerError) -> bool {
        self(error)
    }
}

/// Retries only while the pooler cannot be reached.
pub fn retry_not_ready(error: &PoolerError) -> bool {
    error.kind().is_not_ready()
}

/// Retries every failure.
pub fn retry_any_error(_error: &PoolerError) -> bool {
    true
}

/// Returns the predicate selected by `policy`.
pub fn pause_retry_predicate(policy: PauseRetryPolicy) -> fn(&PoolerError) -> bool {
    match policy {
        PauseRetryPolicy::NotReady => retry_not_ready,
        PauseRetryPolicy::AnyError => retry_any_error,
    }
}
