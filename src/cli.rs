// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rmq-portable`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rmq-portable",
    version,
    about = "Run a self-contained RabbitMQ + Erlang installation from its own directory.",
    long_about = None
)]
pub struct CliArgs {
    /// Installation directory holding `erl*`, `rabbit*` and `data`.
    ///
    /// Default: the directory containing this executable.
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Portable.toml` in the installation directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RMQ_PORTABLE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve the layout and print it with the broker environment, but
    /// write no config files and start nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not start the broker until a `start` command is entered.
    #[arg(long)]
    pub no_autostart: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
