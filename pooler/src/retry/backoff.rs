use std::time::Duration;

use config::shared::PauseRetryConfig;
use rand::Rng;

/// Bounded exponential backoff schedule.
///
/// `steps` is the total number of attempts. The delay slept after the n-th failed attempt is
/// `initial_delay * factor^(n - 1)`, capped at `max_delay` when set, plus a random jitter of up
/// to `jitter * delay`. Nothing is slept after the last attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    steps: u32,
    initial_delay: Duration,
    factor: f64,
    jitter: f64,
    max_delay: Option<Duration>,
}

impl Backoff {
    /// Creates a schedule without jitter or cap.
    pub fn new(steps: u32, initial_delay: Duration, factor: f64) -> Self {
        Self {
            steps: steps.max(1),
            initial_delay,
            factor: factor.max(1.0),
            jitter: 0.0,
            max_delay: None,
        }
    }

    /// Runs the operation once and never sleeps.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Sets the jitter fraction, clamped to `0.0..=1.0`.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_nan() {
            0.0
        } else {
            jitter.clamp(0.0, 1.0)
        };
        self
    }

    /// Caps every delay at `max_delay` before jitter is applied.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Total number of attempts, including the first one.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Delay after the `attempt`-th failure (1-indexed) without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let mut nanos = self.initial_delay.as_nanos() as f64 * self.factor.powi(exponent);
        if let Some(max_delay) = self.max_delay {
            nanos = nanos.min(max_delay.as_nanos() as f64);
        }

        from_nanos_saturating(nanos)
    }

    /// Delay after the `attempt`-th failure (1-indexed) with jitter applied.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter == 0.0 || base.is_zero() {
            return base;
        }

        let jitter_factor = rand::thread_rng().gen_range(0.0..=self.jitter);
        from_nanos_saturating(base.as_nanos() as f64 * (1.0 + jitter_factor))
    }
}

/// Float to integer casts saturate, so huge schedules end up at `u64::MAX` nanoseconds.
fn from_nanos_saturating(nanos: f64) -> Duration {
    Duration::from_nanos(nanos.round() as u64)
}

impl From<&PauseRetryConfig> for Backoff {
    fn from(config: &PauseRetryConfig) -> Self {
        let backoff = Backoff::new(
            config.max_attempts,
            config.initial_delay(),
            config.backoff_multiplier,
        )
        .with_jitter(config.jitter);

        match config.max_delay() {
            Some(max_delay) => backoff.with_max_delay(max_delay),
            None => backoff,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::from(&PauseRetryConfig::default())
    }
}
