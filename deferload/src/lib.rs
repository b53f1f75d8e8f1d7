//! deferload - deferred component loading for async Rust
//!
//! Turns expensive asynchronous producers into cacheable handles and
//! coordinates how they are loaded and displayed:
//!
//! - [`loader`]: retrying, timing-out, single-flight load handles
//! - [`queue`]: priority queue that serializes background preloads
//! - [`fallback`]: show-delay / minimum-display placeholder boundaries
//! - [`deferred`]: registry and preload triggers tying the three together
//!
//! # High-Level API
//!
//! ```
//! use deferload::deferred::{Deferred, OptimizedConfig, PreloadStrategy};
//! use deferload::fallback::{ContentVariant, FallbackKind, View};
//! use deferload::loader::ProducerError;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let deferred = Deferred::default();
//! let table = deferred
//!     .create_optimized_lazy(
//!         "compliance/audit-table",
//!         || async { Ok::<_, ProducerError>(vec!["row"; 3]) },
//!         OptimizedConfig::default()
//!             .with_priority(2)
//!             .with_strategy(PreloadStrategy::Hover)
//!             .with_fallback(FallbackKind::Content, ContentVariant::Table),
//!     )
//!     .unwrap();
//!
//! let mut boundary = table.render();
//! if let View::Ready(rows) = boundary.settled().await {
//!     assert_eq!(rows.len(), 3);
//! }
//! # }
//! ```

pub mod config;
pub mod deferred;
pub mod fallback;
pub mod loader;
pub mod log;
pub mod logging;
pub mod queue;

/// Version of the deferload library and CLI.
///
/// Synchronized across the workspace; injected from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
