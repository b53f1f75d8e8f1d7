//! The producer abstraction.
//!
//! A producer is whatever the host uses to obtain a component: a module
//! fetch, a plugin load, an expensive build step. Each call to
//! [`Producer::produce`] is one load attempt, so producers must be safe to
//! call repeatedly.

use futures::future::BoxFuture;
use std::future::Future;
use thiserror::Error;

/// Future returned by a single load attempt.
pub type ProduceFuture<T> = BoxFuture<'static, Result<T, ProducerError>>;

/// Asynchronous source of a component value.
///
/// Implemented for every `Fn() -> impl Future<Output = Result<T, ProducerError>>`
/// closure, so most callers never implement it by hand:
///
/// ```
/// use deferload::loader::{Producer, ProducerError};
///
/// let producer = || async { Ok::<_, ProducerError>(String::from("UsersTable")) };
/// let _attempt = producer.produce();
/// ```
pub trait Producer<T>: Send + Sync + 'static {
    /// Starts one load attempt.
    fn produce(&self) -> ProduceFuture<T>;
}

impl<T, F, Fut> Producer<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ProducerError>> + Send + 'static,
    T: Send + 'static,
{
    fn produce(&self) -> ProduceFuture<T> {
        Box::pin((self)())
    }
}

/// Failure reported by a producer for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProducerError {
    /// Human-readable error message.
    pub message: String,
}

impl ProducerError {
    /// Creates a new producer error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ProducerError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}
