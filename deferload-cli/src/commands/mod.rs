//! CLI command implementations.
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`simulate`] - Scenario runner against synthetic components

pub mod config;
pub mod simulate;
