//! Queue entries and their ordering.

use crate::loader::{ComponentKey, LoadError, Preloadable};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Completion callback for a queued preload.
pub type PreloadCallback = Box<dyn FnOnce(Result<(), LoadError>) + Send + 'static>;

/// A pending request to preload one handle.
///
/// Entries order by priority (higher first), then by insertion sequence
/// (earlier first), so a max-heap pops them in drain order.
pub struct QueueEntry {
    pub(super) target: Arc<dyn Preloadable>,
    pub(super) priority: i32,
    pub(super) sequence: u64,
    pub(super) callback: Option<PreloadCallback>,
}

impl QueueEntry {
    /// Key of the component this entry preloads.
    pub fn key(&self) -> &ComponentKey {
        self.target.component_key()
    }

    /// Priority captured when the entry was queued.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Insertion sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("key", self.key())
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::BinaryHeap;

    struct Noop(ComponentKey);

    impl Preloadable for Noop {
        fn component_key(&self) -> &ComponentKey {
            &self.0
        }

        fn start_preload(&self) -> BoxFuture<'static, Result<(), LoadError>> {
            futures::future::ready(Ok(())).boxed()
        }
    }

    fn entry(name: &str, priority: i32, sequence: u64) -> QueueEntry {
        QueueEntry {
            target: Arc::new(Noop(ComponentKey::new(name))),
            priority,
            sequence,
            callback: None,
        }
    }

    #[test]
    fn test_heap_pops_by_priority_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(entry("a", 3, 0));
        heap.push(entry("b", 1, 1));
        heap.push(entry("c", 3, 2));
        heap.push(entry("d", 2, 3));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(order, vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_negative_priorities_sort_after_default() {
        let mut heap = BinaryHeap::new();
        heap.push(entry("low", -5, 0));
        heap.push(entry("default", 0, 1));

        assert_eq!(heap.pop().map(|e| e.priority()), Some(0));
        assert_eq!(heap.pop().map(|e| e.priority()), Some(-5));
    }
}
