//! Loader factory.
//!
//! Turns an asynchronous producer into a stable, cacheable handle with
//! retry, per-attempt timeout and single-flight preloading.
//!
//! # Architecture
//!
//! ```text
//!   load() ──────┐                      ┌──► attempt 1 ─ timeout? ─┐
//!   preload() ───┼──► LoadHandle slot ──┤                          │ retry_delay
//!   trigger ─────┘    (one in flight)   └──► attempt 2 ... ◄───────┘
//!                            │
//!                            ▼
//!                 Resolved(Arc<T>) | Failed(LoadError) | evicted
//! ```
//!
//! # Example
//!
//! ```
//! use deferload::loader::{create_handle, LoadOptions, ProducerError};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let options = LoadOptions::default()
//!     .with_retry_count(2)
//!     .with_timeout(Duration::from_secs(1));
//! let handle = create_handle("leave/summary", || async { Ok::<_, ProducerError>(3u8) }, options);
//!
//! assert_eq!(*handle.load().await.unwrap(), 3);
//! # }
//! ```

mod error;
mod handle;
mod key;
mod options;
mod producer;
mod retry;
mod traits;

pub use error::{AttemptError, LoadError};
pub use handle::{HandleState, HandleStats, LoadHandle};
pub use key::ComponentKey;
pub use options::{LoadOptions, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
pub use producer::{ProduceFuture, Producer, ProducerError};
pub use traits::Preloadable;

/// Creates a load handle for `producer`.
///
/// Equivalent to [`LoadHandle::new`]. Handles created this way are not
/// deduplicated; use [`Deferred`](crate::deferred::Deferred) to share one
/// handle per key across a process.
pub fn create_handle<T: Send + Sync + 'static>(
    key: impl Into<ComponentKey>,
    producer: impl Producer<T>,
    options: LoadOptions,
) -> LoadHandle<T> {
    LoadHandle::new(key, producer, options)
}
