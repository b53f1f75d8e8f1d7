//! CLI runner for common setup.
//!
//! Loads configuration, initializes logging and owns the tokio runtime that
//! commands run on.

use crate::error::CliError;
use deferload::config::{config_file_path, ConfigFile};
use deferload::logging::{init_logging, LoggingGuard};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file to load instead of ~/.deferload/config.ini
    pub config: Option<PathBuf>,
    /// Log directory overriding the config file
    pub log_dir: Option<PathBuf>,
    /// Debug-level logging
    pub verbose: bool,
}

impl GlobalOptions {
    /// The config file this invocation reads.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: tokio::runtime::Runtime,
}

impl CliRunner {
    /// Loads configuration, starts logging and builds the runtime.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config_path = options.config_path();
        let config = ConfigFile::load_from(&config_path)?;

        let log_dir = options
            .log_dir
            .clone()
            .unwrap_or_else(|| config.logging.directory.clone());
        let filter = if options.verbose { "debug" } else { "info" };
        let logging_guard = init_logging(&log_dir, &config.logging.file, filter)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        info!(
            version = deferload::VERSION,
            config = %display_path(&config_path),
            log = %logging_guard.path().display(),
            "deferload starting"
        );

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Runs `future` to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn display_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    }
}
