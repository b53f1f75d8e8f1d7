//! Load handles.
//!
//! A [`LoadHandle`] wraps a producer with the retry/timeout policy of its
//! [`LoadOptions`] and caches the outcome. Any number of callers may request
//! the value concurrently; only one attempt sequence is ever in flight per
//! handle and every requester shares its result.
//!
//! # Slot lifecycle
//!
//! ```text
//!            request              success
//!   Empty ───────────► Pending ───────────► Resolved
//!     ▲                   │
//!     │  failure,         │ failure, a render
//!     │  preload only     │ request was waiting
//!     └───────────────────┤
//!                         ▼
//!                       Failed ──reset()──► Empty
//! ```
//!
//! The attempt sequence runs on its own tokio task. Dropping every waiter
//! never aborts it; waiters only stop observing the result.

use super::error::LoadError;
use super::key::ComponentKey;
use super::options::LoadOptions;
use super::producer::Producer;
use super::retry::load_with_retry;
use super::traits::Preloadable;
use crate::log::{Logger, TracingLogger};
use crate::log_warn;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Result shared by every waiter of one attempt sequence.
type SharedLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, LoadError>>>;

/// Who asked for the value.
///
/// Render requests surface failures to the consumer and keep them; preload
/// requests are background hints whose failures are evicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Requester {
    Render,
    Preload,
}

enum Slot<T> {
    Empty,
    Pending {
        requester: Requester,
        load: SharedLoad<T>,
    },
    Resolved(Arc<T>),
    Failed(LoadError),
}

struct SlotCell<T> {
    slot: Slot<T>,
    /// Bumped for every new attempt sequence so a stale sequence can never
    /// overwrite a newer slot.
    generation: u64,
}

enum Request<T> {
    Ready(Result<Arc<T>, LoadError>),
    Wait(SharedLoad<T>),
}

/// Snapshot of a handle's cache slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Nothing requested yet (or a failed preload was evicted).
    Empty,
    /// An attempt sequence is in flight.
    Pending,
    /// The value is cached.
    Resolved,
    /// A render request exhausted its retries; replayed until `reset()`.
    Failed,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Pending => write!(f, "Pending"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Counters describing how a handle has been used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleStats {
    /// Producer invocations across all attempt sequences.
    pub attempts: u32,
    /// Attempt sequences started.
    pub loads_started: u64,
    /// Requests that joined an already in-flight sequence.
    pub coalesced_requests: u64,
}

struct HandleInner<T> {
    key: ComponentKey,
    producer: Arc<dyn Producer<T>>,
    options: LoadOptions,
    logger: Arc<dyn Logger>,
    cell: Mutex<SlotCell<T>>,
    attempts: AtomicU32,
    loads_started: AtomicU64,
    coalesced: AtomicU64,
}

impl<T> HandleInner<T> {
    /// Records the outcome of attempt sequence `generation`.
    fn settle(&self, generation: u64, result: &Result<Arc<T>, LoadError>) {
        let mut cell = self.cell.lock();
        if cell.generation != generation {
            tracing::trace!(key = %self.key, generation, "Ignoring stale load result");
            return;
        }
        let requester = match &cell.slot {
            Slot::Pending { requester, .. } => *requester,
            _ => return,
        };

        match result {
            Ok(value) => cell.slot = Slot::Resolved(Arc::clone(value)),
            Err(error) => match requester {
                Requester::Render => cell.slot = Slot::Failed(error.clone()),
                Requester::Preload => {
                    cell.slot = Slot::Empty;
                    tracing::debug!(
                        key = %self.key,
                        "Evicted failed preload, next request starts fresh"
                    );
                }
            },
        }
    }
}

/// Cacheable, retrying, single-flight handle to a deferred value.
///
/// Handles are cheap to clone; all clones share one cache slot.
///
/// # Example
///
/// ```
/// use deferload::loader::{LoadHandle, LoadOptions, ProducerError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handle = LoadHandle::new(
///     "pages/documents",
///     || async { Ok::<_, ProducerError>(String::from("DocumentsPage")) },
///     LoadOptions::default(),
/// );
///
/// handle.preload().await.unwrap();
/// let page = handle.load().await.unwrap();
/// assert_eq!(page.as_str(), "DocumentsPage");
/// # }
/// ```
pub struct LoadHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for LoadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> LoadHandle<T> {
    /// Creates a handle that logs through `tracing`.
    ///
    /// With `options.preload_eagerly` set, resolution starts immediately;
    /// this needs a running tokio runtime (see [`preload_detached`](Self::preload_detached)).
    pub fn new(
        key: impl Into<ComponentKey>,
        producer: impl Producer<T>,
        options: LoadOptions,
    ) -> Self {
        Self::from_parts(
            key.into(),
            Arc::new(producer),
            options,
            Arc::new(TracingLogger),
        )
    }

    /// Creates a handle from an already shared producer and logger.
    pub fn from_parts(
        key: ComponentKey,
        producer: Arc<dyn Producer<T>>,
        options: LoadOptions,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let handle = Self {
            inner: Arc::new(HandleInner {
                key,
                producer,
                options,
                logger,
                cell: Mutex::new(SlotCell {
                    slot: Slot::Empty,
                    generation: 0,
                }),
                attempts: AtomicU32::new(0),
                loads_started: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        };

        if handle.inner.options.preload_eagerly {
            handle.preload_detached();
        }
        handle
    }

    /// Returns the component key.
    pub fn key(&self) -> &ComponentKey {
        &self.inner.key
    }

    /// Returns the options this handle was created with.
    pub fn options(&self) -> &LoadOptions {
        &self.inner.options
    }

    /// Returns the current slot state.
    pub fn state(&self) -> HandleState {
        match self.inner.cell.lock().slot {
            Slot::Empty => HandleState::Empty,
            Slot::Pending { .. } => HandleState::Pending,
            Slot::Resolved(_) => HandleState::Resolved,
            Slot::Failed(_) => HandleState::Failed,
        }
    }

    /// Returns the cached value without starting a load.
    pub fn get(&self) -> Option<Arc<T>> {
        match &self.inner.cell.lock().slot {
            Slot::Resolved(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Returns usage counters.
    pub fn stats(&self) -> HandleStats {
        HandleStats {
            attempts: self.inner.attempts.load(Ordering::Relaxed),
            loads_started: self.inner.loads_started.load(Ordering::Relaxed),
            coalesced_requests: self.inner.coalesced.load(Ordering::Relaxed),
        }
    }

    /// Requests the value for rendering.
    ///
    /// Returns the cached value, joins the in-flight sequence, or starts a
    /// new one. A failure is kept in the slot and replayed to later render
    /// requests until [`reset`](Self::reset) is called.
    pub async fn load(&self) -> Result<Arc<T>, LoadError> {
        self.load_future().await
    }

    /// Starts (or joins) resolution in the background and waits for it.
    ///
    /// A failure is logged as a warning and evicted from the slot, so the
    /// next request of any kind starts a fresh sequence. The error is still
    /// returned to this caller; render requests that were sharing the same
    /// sequence receive it too.
    pub async fn preload(&self) -> Result<(), LoadError> {
        self.preload_future().await
    }

    /// Fire-and-forget [`preload`](Self::preload).
    ///
    /// Returns `false` (and logs a warning) when called outside a tokio
    /// runtime; the handle then simply stays lazy.
    pub fn preload_detached(&self) -> bool {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let preload = self.preload_future();
                runtime.spawn(async move {
                    let _ = preload.await;
                });
                true
            }
            Err(_) => {
                log_warn!(
                    self.inner.logger,
                    "No async runtime available, '{}' will load on first request",
                    self.inner.key
                );
                false
            }
        }
    }

    /// Clears a failed slot so the next request starts over.
    ///
    /// Returns `true` if the slot was `Failed`.
    pub fn reset(&self) -> bool {
        let mut cell = self.inner.cell.lock();
        if matches!(cell.slot, Slot::Failed(_)) {
            cell.slot = Slot::Empty;
            cell.generation += 1;
            tracing::debug!(key = %self.inner.key, "Reset failed component");
            true
        } else {
            false
        }
    }

    fn load_future(&self) -> BoxFuture<'static, Result<Arc<T>, LoadError>> {
        match self.request(Requester::Render) {
            Request::Ready(result) => futures::future::ready(result).boxed(),
            Request::Wait(load) => load.boxed(),
        }
    }

    fn preload_future(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        let request = self.request(Requester::Preload);
        let key = self.inner.key.clone();
        let logger = Arc::clone(&self.inner.logger);

        async move {
            let result = match request {
                Request::Ready(result) => result,
                Request::Wait(load) => load.await,
            };
            match result {
                Ok(_) => Ok(()),
                Err(error) => {
                    log_warn!(logger, "Preload of '{}' failed: {}", key, error);
                    Err(error)
                }
            }
        }
        .boxed()
    }

    /// Check-then-start under one lock, so concurrent requesters can never
    /// start two sequences.
    fn request(&self, requester: Requester) -> Request<T> {
        let mut cell = self.inner.cell.lock();

        match &mut cell.slot {
            Slot::Resolved(value) => return Request::Ready(Ok(Arc::clone(value))),
            Slot::Failed(error) if requester == Requester::Render => {
                return Request::Ready(Err(error.clone()));
            }
            Slot::Pending {
                requester: origin,
                load,
            } => {
                if requester == Requester::Render {
                    *origin = Requester::Render;
                }
                self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %self.inner.key, ?requester, "Joining in-flight load");
                return Request::Wait(load.clone());
            }
            Slot::Empty | Slot::Failed(_) => {}
        }

        cell.generation += 1;
        let generation = cell.generation;
        let load = self.spawn_sequence(generation);
        cell.slot = Slot::Pending {
            requester,
            load: load.clone(),
        };
        Request::Wait(load)
    }

    fn spawn_sequence(&self, generation: u64) -> SharedLoad<T> {
        self.inner.loads_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            key = %self.inner.key,
            generation,
            max_attempts = self.inner.options.max_attempts(),
            timeout_ms = self.inner.options.timeout.as_millis() as u64,
            "Starting component load"
        );

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = load_with_retry(
                &inner.key,
                inner.producer.as_ref(),
                &inner.options,
                &inner.attempts,
            )
            .await
            .map(Arc::new);
            inner.settle(generation, &result);
            result
        });

        // Weak: the slot owns this future, which must not keep the slot alive.
        let weak: Weak<HandleInner<T>> = Arc::downgrade(&self.inner);
        async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    let error = LoadError::Aborted(join_error.to_string());
                    if let Some(inner) = weak.upgrade() {
                        inner.settle(generation, &Err(error.clone()));
                    }
                    Err(error)
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl<T: Send + Sync + 'static> Preloadable for LoadHandle<T> {
    fn component_key(&self) -> &ComponentKey {
        &self.inner.key
    }

    fn start_preload(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        self.preload_future()
    }
}

impl<T: Send + Sync + 'static> IntoFuture for &LoadHandle<T> {
    type Output = Result<Arc<T>, LoadError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.load_future()
    }
}

impl<T: Send + Sync + 'static> IntoFuture for LoadHandle<T> {
    type Output = Result<Arc<T>, LoadError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.load_future()
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for LoadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle")
            .field("key", &self.inner.key)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
