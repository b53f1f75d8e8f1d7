//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use clap::Subcommand;
use deferload::config::ConfigFile;
use std::path::Path;

use crate::error::CliError;
use crate::runner::GlobalOptions;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, options: &GlobalOptions) -> Result<(), CliError> {
    let path = options.config_path();
    match command {
        ConfigCommands::Path => run_path(&path),
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist, defaults apply)");
    }
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    print!("{}", render_settings(&config));
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if force {
        ConfigFile::default().save_to(path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(path)? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists (use --force to overwrite)", path.display());
    }
    Ok(())
}

/// Formats effective settings as `[section]` blocks of `key = value` lines.
fn render_settings(config: &ConfigFile) -> String {
    let sections: [(&str, Vec<(&str, String)>); 4] = [
        (
            "loader",
            vec![
                ("retry_count", config.loader.retry_count.to_string()),
                ("retry_delay_ms", config.loader.retry_delay_ms.to_string()),
                ("timeout_ms", config.loader.timeout_ms.to_string()),
                ("preload_eagerly", config.loader.preload_eagerly.to_string()),
            ],
        ),
        ("queue", vec![("yield_ms", config.queue.yield_ms.to_string())]),
        (
            "fallback",
            vec![
                ("show_delay", config.fallback.show_delay.to_string()),
                ("show_delay_ms", config.fallback.show_delay_ms.to_string()),
                ("min_display_ms", config.fallback.min_display_ms.to_string()),
                ("table_rows", config.fallback.table_rows.to_string()),
                ("form_fields", config.fallback.form_fields.to_string()),
                ("stagger_ms", config.fallback.stagger_ms.to_string()),
            ],
        ),
        (
            "logging",
            vec![
                ("directory", config.logging.directory.display().to_string()),
                ("file", config.logging.file.clone()),
            ],
        ),
    ];

    let mut out = String::new();
    for (i, (section, entries)) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", section));
        for (key, value) in entries {
            out.push_str(&format!("{} = {}\n", key, value));
        }
    }
    out
}
