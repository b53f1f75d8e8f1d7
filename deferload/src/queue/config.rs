//! Preload queue configuration.

use std::time::Duration;

/// Default pause between two drained entries.
pub const DEFAULT_YIELD_DELAY: Duration = Duration::from_millis(10);

/// Default priority for keys that never had one recorded.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Configuration for [`PreloadQueue`](super::PreloadQueue).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// Pause after each entry so the drain loop never monopolizes the
    /// runtime.
    pub yield_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            yield_delay: DEFAULT_YIELD_DELAY,
        }
    }
}

impl From<&crate::config::QueueSettings> for QueueConfig {
    fn from(settings: &crate::config::QueueSettings) -> Self {
        Self {
            yield_delay: Duration::from_millis(settings.yield_ms),
        }
    }
}
