//! Logger abstraction for components that report to the host.
//!
//! Most of the crate logs through `tracing` macros directly. Components
//! whose messages are part of their contract (a failed background preload
//! must produce a warning, and nothing else) take an `Arc<dyn Logger>`
//! instead, so tests can capture or silence them.
//!
//! - [`Logger`]: the interface, with `log_*!` macros for format strings
//! - [`TracingLogger`]: forwards to `tracing`
//! - [`NoOpLogger`]: discards everything
//! - [`MemoryLogger`]: keeps messages in memory for assertions
//!
//! ```
//! use deferload::log::{LogLevel, Logger, MemoryLogger};
//! use deferload::log_warn;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryLogger::new());
//! let logger: Arc<dyn Logger> = memory.clone();
//! log_warn!(logger, "Preload of '{}' failed", "pages/users");
//!
//! assert_eq!(memory.count(LogLevel::Warn), 1);
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::MemoryLogger;
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
