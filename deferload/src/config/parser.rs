//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{
    MAX_DELAY_MS, MAX_LOADER_RETRY_COUNT, MAX_LOADER_TIMEOUT_MS, MAX_SKELETON_ELEMENTS,
};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [loader] section
    if let Some(section) = ini.section(Some("loader")) {
        if let Some(v) =
            parse_in_range(section, "loader", "retry_count", 0..=MAX_LOADER_RETRY_COUNT)?
        {
            config.loader.retry_count = v;
        }
        if let Some(v) = parse_in_range(section, "loader", "retry_delay_ms", 0..=MAX_DELAY_MS)? {
            config.loader.retry_delay_ms = v;
        }
        if let Some(v) =
            parse_in_range(section, "loader", "timeout_ms", 1..=MAX_LOADER_TIMEOUT_MS)?
        {
            config.loader.timeout_ms = v;
        }
        if let Some(v) = section.get("preload_eagerly") {
            config.loader.preload_eagerly = parse_bool(v);
        }
    }

    // [queue] section
    if let Some(section) = ini.section(Some("queue")) {
        if let Some(v) = parse_in_range(section, "queue", "yield_ms", 0..=MAX_DELAY_MS)? {
            config.queue.yield_ms = v;
        }
    }

    // [fallback] section
    if let Some(section) = ini.section(Some("fallback")) {
        if let Some(v) = section.get("show_delay") {
            config.fallback.show_delay = parse_bool(v);
        }
        if let Some(v) = parse_in_range(section, "fallback", "show_delay_ms", 0..=MAX_DELAY_MS)? {
            config.fallback.show_delay_ms = v;
        }
        if let Some(v) = parse_in_range(section, "fallback", "min_display_ms", 0..=MAX_DELAY_MS)? {
            config.fallback.min_display_ms = v;
        }
        if let Some(v) =
            parse_in_range(section, "fallback", "table_rows", 0..=MAX_SKELETON_ELEMENTS)?
        {
            config.fallback.table_rows = v;
        }
        if let Some(v) =
            parse_in_range(section, "fallback", "form_fields", 0..=MAX_SKELETON_ELEMENTS)?
        {
            config.fallback.form_fields = v;
        }
        if let Some(v) = parse_in_range(section, "fallback", "stagger_ms", 0..=MAX_DELAY_MS)? {
            config.fallback.stagger_ms = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid("logging", "file", v, "must be a plain file name"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

/// Parses `key` as a non-negative integer if present.
fn parse_number<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        None => Ok(None),
        Some(v) => v.trim().parse().map(Some).map_err(|_| {
            invalid(section_name, key, v, "must be a non-negative integer")
        }),
    }
}

/// Parses `key` like [`parse_number`] and rejects values outside `range`.
fn parse_in_range<T: FromStr + PartialOrd + Display>(
    section: &Properties,
    section_name: &str,
    key: &str,
    range: RangeInclusive<T>,
) -> Result<Option<T>, ConfigFileError> {
    match parse_number(section, section_name, key)? {
        Some(v) if !range.contains(&v) => Err(invalid(
            section_name,
            key,
            &v.to_string(),
            &format!("must be between {} and {}", range.start(), range.end()),
        )),
        parsed => Ok(parsed),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_partial_config() {
        let config = parse(
            r#"
[loader]
retry_count = 1
timeout_ms = 2500

[fallback]
show_delay = no
"#,
        )
        .unwrap();

        assert_eq!(config.loader.retry_count, 1);
        assert_eq!(config.loader.timeout_ms, 2500);
        assert_eq!(config.loader.retry_delay_ms, DEFAULT_LOADER_RETRY_DELAY_MS);
        assert!(!config.fallback.show_delay);
        assert_eq!(config.fallback.min_display_ms, DEFAULT_FALLBACK_MIN_DISPLAY_MS);
        assert_eq!(config.queue.yield_ms, DEFAULT_QUEUE_YIELD_MS);
    }

    #[test]
    fn test_invalid_number_reports_section_and_key() {
        let err = parse("[queue]\nyield_ms = soon\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section,
                key,
                value,
                ..
            } => {
                assert_eq!(section, "queue");
                assert_eq!(key, "yield_ms");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_negative_retry_count_rejected() {
        assert!(parse("[loader]\nretry_count = -1\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse("[loader]\ntimeout_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("loader.timeout_ms"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let cases = [
            ("loader", "retry_count", "101"),
            ("loader", "retry_delay_ms", "60001"),
            ("loader", "timeout_ms", "600001"),
            ("queue", "yield_ms", "60001"),
            ("fallback", "show_delay_ms", "60001"),
            ("fallback", "min_display_ms", "18446744073709551615"),
            ("fallback", "stagger_ms", "60001"),
            ("fallback", "table_rows", "1001"),
            ("fallback", "form_fields", "1000000000"),
        ];
        for (section, key, value) in cases {
            let content = format!("[{}]\n{} = {}\n", section, key, value);
            match parse(&content) {
                Err(ConfigFileError::InvalidValue {
                    section: s,
                    key: k,
                    reason,
                    ..
                }) => {
                    assert_eq!((s.as_str(), k.as_str()), (section, key));
                    assert!(reason.starts_with("must be between"), "{}", reason);
                }
                other => panic!("{}.{} = {} accepted: {:?}", section, key, value, other),
            }
        }
    }

    #[test]
    fn test_values_at_limits_accepted() {
        let config = parse(
            "[loader]\nretry_count = 100\ntimeout_ms = 600000\n\n\
             [fallback]\nmin_display_ms = 60000\ntable_rows = 1000\n",
        )
        .unwrap();
        assert_eq!(config.loader.retry_count, MAX_LOADER_RETRY_COUNT);
        assert_eq!(config.loader.timeout_ms, MAX_LOADER_TIMEOUT_MS);
        assert_eq!(config.fallback.min_display_ms, MAX_DELAY_MS);
        assert_eq!(config.fallback.table_rows, MAX_SKELETON_ELEMENTS);
    }

    #[test]
    fn test_log_file_must_be_plain_name() {
        assert!(parse("[logging]\nfile = ../escape.log\n").is_err());
        let config = parse("[logging]\nfile = app.log\n").unwrap();
        assert_eq!(config.logging.file, "app.log");
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/logs");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("logs"));
        }
        assert_eq!(expand_tilde("/var/log"), PathBuf::from("/var/log"));
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "1", "yes", "on", " TRUE "] {
            assert!(parse_bool(v), "{}", v);
        }
        for v in ["false", "0", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{}", v);
        }
    }
}
