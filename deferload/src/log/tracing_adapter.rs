//! Forwarding to `tracing`.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Logger that forwards to the `tracing` macros under the `deferload`
/// target, so `RUST_LOG=deferload=debug` filters it with the rest of the
/// crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "deferload", "{}", args),
            LogLevel::Debug => tracing::debug!(target: "deferload", "{}", args),
            LogLevel::Info => tracing::info!(target: "deferload", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "deferload", "{}", args),
            LogLevel::Error => tracing::error!(target: "deferload", "{}", args),
        }
    }
}
