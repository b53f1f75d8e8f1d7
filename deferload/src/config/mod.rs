//! Configuration file support.
//!
//! The INI file at `~/.deferload/config.ini` carries process-wide defaults
//! for load handles, the preload queue, fallback boundaries and logging.
//! Each section converts into the runtime type it configures:
//!
//! ```
//! use deferload::config::ConfigFile;
//! use deferload::fallback::FallbackConfig;
//! use deferload::loader::LoadOptions;
//! use deferload::queue::QueueConfig;
//!
//! let config = ConfigFile::default();
//! let options = LoadOptions::from(&config.loader);
//! let queue = QueueConfig::from(&config.queue);
//! let fallback = FallbackConfig::from(&config.fallback);
//!
//! assert_eq!(options.max_attempts(), 4);
//! assert!(fallback.show_delay);
//! # let _ = queue;
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, FallbackSettings, LoaderSettings, LoggingSettings, QueueSettings};
