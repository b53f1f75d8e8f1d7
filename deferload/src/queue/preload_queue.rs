//! The preload queue and its drain loop.

use super::config::{QueueConfig, DEFAULT_PRIORITY};
use super::entry::{PreloadCallback, QueueEntry};
use crate::loader::{ComponentKey, LoadError, Preloadable};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counters describing queue activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Entries queued since creation.
    pub queued: u64,
    /// Entries whose preload succeeded.
    pub succeeded: u64,
    /// Entries whose preload failed.
    pub failed: u64,
}

struct QueueState {
    pending: BinaryHeap<QueueEntry>,
    draining: bool,
    next_sequence: u64,
}

struct QueueInner {
    config: QueueConfig,
    state: Mutex<QueueState>,
    priorities: DashMap<ComponentKey, i32>,
    idle: Notify,
    queued: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Serializes background preloads by priority.
///
/// Exactly one entry is being preloaded at a time. Entries drain in strictly
/// descending priority; equal priorities drain in the order they were
/// queued. The drain loop starts on the first `queue_load` and stops by
/// itself once the queue is empty.
///
/// The queue is cheap to clone; clones share the same pending list.
///
/// # Example
///
/// ```
/// use deferload::loader::{LoadHandle, LoadOptions, ProducerError};
/// use deferload::queue::PreloadQueue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = PreloadQueue::default();
/// let table = LoadHandle::new("users/table", || async { Ok::<_, ProducerError>(1) }, LoadOptions::default());
///
/// queue.set_priority(table.key(), 5);
/// queue.queue_load_with(table.clone(), |result| {
///     if let Err(e) = result {
///         eprintln!("preload failed: {}", e);
///     }
/// });
/// queue.wait_idle().await;
/// assert!(table.get().is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct PreloadQueue {
    inner: Arc<QueueInner>,
}

impl PreloadQueue {
    /// Creates an empty, idle queue.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                config,
                state: Mutex::new(QueueState {
                    pending: BinaryHeap::new(),
                    draining: false,
                    next_sequence: 0,
                }),
                priorities: DashMap::new(),
                idle: Notify::new(),
                queued: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        }
    }

    /// Records (or overwrites) the priority used for `key` by later
    /// `queue_load` calls. Entries already queued keep their priority.
    pub fn set_priority(&self, key: &ComponentKey, priority: i32) {
        self.inner.priorities.insert(key.clone(), priority);
    }

    /// Returns the recorded priority for `key` (0 if never set).
    pub fn priority(&self, key: &ComponentKey) -> i32 {
        self.inner
            .priorities
            .get(key)
            .map(|p| *p)
            .unwrap_or(DEFAULT_PRIORITY)
    }

    /// Queues a preload without a completion callback.
    ///
    /// Must be called from within a tokio runtime.
    pub fn queue_load(&self, target: impl Preloadable) {
        self.enqueue(Arc::new(target), None);
    }

    /// Queues a preload; `callback` receives its outcome.
    ///
    /// Must be called from within a tokio runtime.
    pub fn queue_load_with(
        &self,
        target: impl Preloadable,
        callback: impl FnOnce(Result<(), LoadError>) + Send + 'static,
    ) {
        self.enqueue(Arc::new(target), Some(Box::new(callback)));
    }

    /// Queues an already shared preload target.
    pub fn queue_shared(&self, target: Arc<dyn Preloadable>, callback: Option<PreloadCallback>) {
        self.enqueue(target, callback);
    }

    /// Number of entries waiting (not counting the one in flight).
    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Returns true while the drain loop is running.
    pub fn is_draining(&self) -> bool {
        self.inner.state.lock().draining
    }

    /// Returns activity counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.inner.queued.load(Ordering::Relaxed),
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Waits until the queue is empty and the drain loop has stopped.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.inner.state.lock();
                if !state.draining && state.pending.is_empty() {
                    return;
                }
            }
            notified.await;
        }
    }

    fn enqueue(&self, target: Arc<dyn Preloadable>, callback: Option<PreloadCallback>) {
        let priority = self.priority(target.component_key());
        let start_drain = {
            let mut state = self.inner.state.lock();
            let sequence = state.next_sequence;
            state.next_sequence += 1;

            tracing::debug!(
                key = %target.component_key(),
                priority,
                sequence,
                pending = state.pending.len() + 1,
                "Queued component preload"
            );
            state.pending.push(QueueEntry {
                target,
                priority,
                sequence,
                callback,
            });

            !std::mem::replace(&mut state.draining, true)
        };
        self.inner.queued.fetch_add(1, Ordering::Relaxed);

        if start_drain {
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }
    }
}

impl Default for PreloadQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl std::fmt::Debug for PreloadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PreloadQueue")
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Drain loop: one entry at a time until the queue is empty.
async fn drain(inner: Arc<QueueInner>) {
    tracing::trace!("Preload queue draining");
    loop {
        let entry = {
            let mut state = inner.state.lock();
            match state.pending.pop() {
                Some(entry) => entry,
                None => {
                    state.draining = false;
                    inner.idle.notify_waiters();
                    tracing::trace!("Preload queue idle");
                    return;
                }
            }
        };

        let QueueEntry {
            target,
            priority,
            callback,
            ..
        } = entry;
        let result = target.start_preload().await;

        match &result {
            Ok(()) => {
                inner.succeeded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %target.component_key(), priority, "Queued preload finished");
            }
            Err(e) => {
                inner.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    key = %target.component_key(),
                    priority,
                    error = %e,
                    "Queued preload failed"
                );
            }
        }
        if let Some(callback) = callback {
            let key = target.component_key().clone();
            if panic::catch_unwind(AssertUnwindSafe(|| callback(result))).is_err() {
                tracing::error!(key = %key, "Preload callback panicked");
            }
        }

        tokio::time::sleep(inner.config.yield_delay).await;
    }
}
