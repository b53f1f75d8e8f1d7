//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Load handle defaults
    pub loader: LoaderSettings,
    /// Preload queue settings
    pub queue: QueueSettings,
    /// Fallback boundary settings
    pub fallback: FallbackSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Defaults for load handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Retries after the first failed attempt
    pub retry_count: u32,
    /// Wait between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Per-attempt budget in milliseconds (must be positive)
    pub timeout_ms: u64,
    /// Start loading as soon as a handle is declared
    pub preload_eagerly: bool,
}

/// Preload queue configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Pause between drained entries in milliseconds
    pub yield_ms: u64,
}

/// Fallback boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSettings {
    /// Hide the placeholder during the show delay
    pub show_delay: bool,
    /// Show delay in milliseconds
    pub show_delay_ms: u64,
    /// Minimum time from mount a shown placeholder stays, in milliseconds
    pub min_display_ms: u64,
    /// Rows in a table skeleton
    pub table_rows: usize,
    /// Label/input pairs in a form skeleton
    pub form_fields: usize,
    /// Reveal stagger between skeleton elements in milliseconds
    pub stagger_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log directory
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}
