use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Which failures of the pause command are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseRetryPolicy {
    /// Retry only while the pooler cannot be reached yet.
    #[default]
    NotReady,
    /// Retry every failure until the attempt budget runs out.
    AnyError,
}

/// Bounded exponential backoff applied to the pause command.
///
/// The defaults retry four times in total, sleeping roughly 10ms, 50ms and 250ms in between,
/// which covers a pooler that is still binding its socket when the pause arrives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PauseRetryConfig {
    /// Total number of attempts, including the first one.
    ///
    /// Default: 4
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds.
    ///
    /// Default: 10
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after each failed attempt. Must be >= 1.0.
    ///
    /// Default: 5.0
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Fraction of each delay added as random jitter, between 0.0 and 1.0.
    ///
    /// Default: 0.1
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Upper bound for a single delay, in milliseconds. Unbounded when absent.
    #[serde(default)]
    pub max_delay_ms: Option<u64>,

    /// Failures that trigger another attempt.
    #[serde(default)]
    pub policy: PauseRetryPolicy,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay_ms() -> u64 {
    10
}

fn default_backoff_multiplier() -> f64 {
    5.0
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for PauseRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
            max_delay_ms: None,
            policy: PauseRetryPolicy::default(),
        }
    }
}

impl PauseRetryConfig {
    /// Returns the initial delay as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Returns the delay cap as a [`Duration`], if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay_ms.map(Duration::from_millis)
    }

    /// Validates the [`PauseRetryConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "pause_retry.max_attempts".to_string(),
                constraint: "must be >= 1".to_string(),
            });
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "pause_retry.backoff_multiplier".to_string(),
                constraint: "must be >= 1.0".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ValidationError::InvalidFieldValue {
                field: "pause_retry.jitter".to_string(),
                constraint: "must be between 0.0 and 1.0".to_string(),
            });
        }

        if self
            .max_delay_ms
            .is_some_and(|max_delay_ms| max_delay_ms < self.initial_delay_ms)
        {
            return Err(ValidationError::InvalidFieldValue {
                field: "pause_retry.max_delay_ms".to_string(),
                constraint: "must be >= initial_delay_ms".to_string(),
            });
        }

        Ok(())
    }
}
