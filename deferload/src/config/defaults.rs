//! Default values for all configuration settings.
//!
//! Runtime defaults live next to the types they configure; this module
//! maps them onto the INI settings and implements `ConfigFile::default()`.

use std::path::PathBuf;

use super::settings::*;
use crate::fallback::{SkeletonOptions, DEFAULT_MIN_DISPLAY, DEFAULT_SHOW_DELAY};
use crate::loader::{DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
use crate::queue::DEFAULT_YIELD_DELAY;

/// Default retry count.
pub const DEFAULT_LOADER_RETRY_COUNT: u32 = DEFAULT_RETRY_COUNT;

/// Default retry delay in milliseconds.
pub const DEFAULT_LOADER_RETRY_DELAY_MS: u64 = DEFAULT_RETRY_DELAY.as_millis() as u64;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_LOADER_TIMEOUT_MS: u64 = DEFAULT_TIMEOUT.as_millis() as u64;

/// Default queue yield in milliseconds.
pub const DEFAULT_QUEUE_YIELD_MS: u64 = DEFAULT_YIELD_DELAY.as_millis() as u64;

/// Default show delay in milliseconds.
pub const DEFAULT_FALLBACK_SHOW_DELAY_MS: u64 = DEFAULT_SHOW_DELAY.as_millis() as u64;

/// Default minimum display in milliseconds.
pub const DEFAULT_FALLBACK_MIN_DISPLAY_MS: u64 = DEFAULT_MIN_DISPLAY.as_millis() as u64;

/// Largest accepted `retry_count`.
pub const MAX_LOADER_RETRY_COUNT: u32 = 100;

/// Largest accepted `timeout_ms`.
pub const MAX_LOADER_TIMEOUT_MS: u64 = 600_000;

/// Largest accepted value for the other millisecond settings.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Largest accepted `table_rows` / `form_fields`.
pub const MAX_SKELETON_ELEMENTS: usize = 1_000;

impl Default for ConfigFile {
    fn default() -> Self {
        let skeleton = SkeletonOptions::default();
        Self {
            loader: LoaderSettings {
                retry_count: DEFAULT_LOADER_RETRY_COUNT,
                retry_delay_ms: DEFAULT_LOADER_RETRY_DELAY_MS,
                timeout_ms: DEFAULT_LOADER_TIMEOUT_MS,
                preload_eagerly: false,
            },
            queue: QueueSettings {
                yield_ms: DEFAULT_QUEUE_YIELD_MS,
            },
            fallback: FallbackSettings {
                show_delay: true,
                show_delay_ms: DEFAULT_FALLBACK_SHOW_DELAY_MS,
                min_display_ms: DEFAULT_FALLBACK_MIN_DISPLAY_MS,
                table_rows: skeleton.table_rows,
                form_fields: skeleton.form_fields,
                stagger_ms: skeleton.stagger.as_millis() as u64,
            },
            logging: LoggingSettings {
                directory: PathBuf::from(crate::logging::default_log_dir()),
                file: crate::logging::default_log_file().to_string(),
            },
        }
    }
}
