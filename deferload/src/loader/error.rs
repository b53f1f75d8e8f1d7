//! Error types for deferred loading.
//!
//! Errors are shared between every waiter of an in-flight load, so all of
//! them are `Clone`.

use super::producer::ProducerError;
use std::time::Duration;
use thiserror::Error;

/// Why a single load attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The attempt did not settle within its time budget.
    #[error("load attempt timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The producer rejected the attempt.
    #[error("producer failed: {0}")]
    Producer(#[from] ProducerError),
}

/// Terminal failure of a load handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Every allowed attempt failed; wraps the last attempt's error.
    #[error("load failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    /// The background load task ended without producing a result.
    #[error("load task aborted: {0}")]
    Aborted(String),
}

impl LoadError {
    /// Returns true if the final attempt failed by timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Exhausted {
                last: AttemptError::Timeout { .. },
                ..
            }
        )
    }

    /// Number of attempts made before giving up (0 if aborted).
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Aborted(_) => 0,
        }
    }
}
