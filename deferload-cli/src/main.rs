//! deferload CLI
//!
//! Drives the deferload library against synthetic components and manages
//! its configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use error::CliError;
use runner::{CliRunner, GlobalOptions};

#[derive(Parser)]
#[command(name = "deferload")]
#[command(version = deferload::VERSION)]
#[command(about = "Deferred component loading: simulate and configure", long_about = None)]
struct Cli {
    /// Config file (default: ~/.deferload/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log directory, overriding [logging] directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run loading scenarios and print their timelines
    Simulate(SimulateArgs),

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        log_dir: cli.log_dir,
        verbose: cli.verbose,
    };

    if let Err(e) = run(cli.command, &options) {
        e.exit();
    }
}

fn run(command: Commands, options: &GlobalOptions) -> Result<(), CliError> {
    match command {
        Commands::Simulate(args) => {
            let runner = CliRunner::new(options)?;
            commands::simulate::run(args, &runner)
        }
        Commands::Config(command) => commands::config::run(command, options),
    }
}
