//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[loader]
; Retries after the first failed attempt (total attempts = retry_count + 1)
retry_count = {}
; Wait between a failed attempt and the next one, in milliseconds
retry_delay_ms = {}
; Time budget of a single attempt, in milliseconds. A slower attempt counts
; as failed and is retried like any other failure.
timeout_ms = {}
; Start loading every component as soon as it is declared
preload_eagerly = {}

[queue]
; Pause between two background preloads, in milliseconds
yield_ms = {}

[fallback]
; Hide the placeholder for loads that finish within show_delay_ms
show_delay = {}
show_delay_ms = {}
; Once shown, keep the placeholder until this long after mount (milliseconds)
min_display_ms = {}
; Skeleton shape details
table_rows = {}
form_fields = {}
stagger_ms = {}

[logging]
; Log directory (relative paths are resolved from the working directory)
directory = {}
file = {}
"#,
        config.loader.retry_count,
        config.loader.retry_delay_ms,
        config.loader.timeout_ms,
        config.loader.preload_eagerly,
        config.queue.yield_ms,
        config.fallback.show_delay,
        config.fallback.show_delay_ms,
        config.fallback.min_display_ms,
        config.fallback.table_rows,
        config.fallback.form_fields,
        config.fallback.stagger_ms,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Convert a path to a string, using ~ for the home directory.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.loader.retry_count = 5;
        config.loader.preload_eagerly = true;
        config.queue.yield_ms = 0;
        config.fallback.show_delay = false;
        config.fallback.table_rows = 12;
        config.logging.directory = temp_dir.path().join("logs");

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_written_file_is_commented() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.starts_with("[loader]"));
        assert!(content.contains("; Time budget of a single attempt"));
        assert!(content.contains("timeout_ms = 10000"));
        assert!(content.contains("min_display_ms = 500"));
    }

    #[test]
    fn test_path_to_string_uses_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path_to_string(&home.join("logs")), "~/logs");
        }
        assert_eq!(path_to_string(Path::new("logs")), "logs");
    }
}
