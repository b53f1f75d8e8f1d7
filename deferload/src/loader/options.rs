//! Load handle options.

use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Default number of retries after the first failed attempt.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default wait between a failed attempt and the next one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Default time budget of a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

// =============================================================================
// Options
// =============================================================================

/// Retry, timeout and eagerness settings for one load handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Retries allowed after the first attempt (total attempts = `retry_count + 1`).
    pub retry_count: u32,

    /// Wait between a failed attempt and the next.
    pub retry_delay: Duration,

    /// Budget for a single attempt. An attempt still pending at the deadline
    /// counts as failed.
    pub timeout: Duration,

    /// Start resolving as soon as the handle is created.
    pub preload_eagerly: bool,
}

impl LoadOptions {
    /// Sets the retry count.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Sets the delay between attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables eager preloading.
    pub fn with_preload_eagerly(mut self, preload_eagerly: bool) -> Self {
        self.preload_eagerly = preload_eagerly;
        self
    }

    /// Total number of attempts a handle with these options may make.
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
            preload_eagerly: false,
        }
    }
}

impl From<&crate::config::LoaderSettings> for LoadOptions {
    fn from(settings: &crate::config::LoaderSettings) -> Self {
        Self {
            retry_count: settings.retry_count,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            timeout: Duration::from_millis(settings.timeout_ms),
            preload_eagerly: settings.preload_eagerly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoadOptions::default();
        assert_eq!(options.retry_count, 3);
        assert_eq!(options.retry_delay, Duration::from_secs(1));
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert!(!options.preload_eagerly);
        assert_eq!(options.max_attempts(), 4);
    }

    #[test]
    fn test_builder_methods() {
        let options = LoadOptions::default()
            .with_retry_count(0)
            .with_retry_delay(Duration::from_millis(5))
            .with_timeout(Duration::from_millis(250))
            .with_preload_eagerly(true);

        assert_eq!(options.max_attempts(), 1);
        assert_eq!(options.retry_delay, Duration::from_millis(5));
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert!(options.preload_eagerly);
    }

    #[test]
    fn test_max_attempts_saturates() {
        let options = LoadOptions::default().with_retry_count(u32::MAX);
        assert_eq!(options.max_attempts(), u32::MAX);
    }

    #[test]
    fn test_from_settings() {
        let settings = crate::config::LoaderSettings {
            retry_count: 2,
            retry_delay_ms: 40,
            timeout_ms: 900,
            preload_eagerly: true,
        };
        let options = LoadOptions::from(&settings);
        assert_eq!(options.retry_count, 2);
        assert_eq!(options.retry_delay, Duration::from_millis(40));
        assert_eq!(options.timeout, Duration::from_millis(900));
        assert!(options.preload_eagerly);
    }
}
