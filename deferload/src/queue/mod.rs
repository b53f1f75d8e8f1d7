//! Priority preload queue.
//!
//! Background preloads are funnelled through a single drain loop so they
//! never compete with each other for bandwidth. Callers record a priority
//! per component key; entries drain highest priority first, ties in FIFO
//! order, with a short yield between entries.

mod config;
mod entry;
mod preload_queue;

pub use config::{QueueConfig, DEFAULT_PRIORITY, DEFAULT_YIELD_DELAY};
pub use entry::{PreloadCallback, QueueEntry};
pub use preload_queue::{PreloadQueue, QueueStats};
