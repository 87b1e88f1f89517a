// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Startup failures (`MissingRuntime` .. `ConfigWriteFailed`) are fatal and
//! abort the run. `ConsoleScriptWriteFailed` only disables the console
//! command. Spawn and stop failures are reported to the caller as `false`
//! from the supervisor and never retried here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortableError {
    #[error("cannot find an erlang directory (erl*) in {base:?}")]
    MissingRuntime { base: PathBuf },

    #[error(
        "cannot find an erts directory inside {runtime:?}; the erlang installation looks invalid or incomplete"
    )]
    IncompleteRuntime { runtime: PathBuf },

    #[error("cannot find a rabbitmq directory (rabbit*) in {base:?}")]
    MissingBroker { base: PathBuf },

    #[error("cannot create data directory {path:?}: {reason}")]
    DataDirCreateFailed { path: PathBuf, reason: String },

    #[error("error updating {path:?}: {reason}")]
    ConfigWriteFailed { path: PathBuf, reason: String },

    #[error("error writing console script {path:?}: {reason}")]
    ConsoleScriptWriteFailed { path: PathBuf, reason: String },

    #[error("error starting {path:?}: {source}")]
    ProcessSpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error stopping server: {0}")]
    StopFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PortableError {
    /// Whether this error must abort startup when it occurs during the
    /// resolve / bootstrap phase.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PortableError::ConsoleScriptWriteFailed { .. }
                | PortableError::ProcessSpawnFailed { .. }
                | PortableError::StopFailed(_)
        )
    }

    /// Short stable label for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            PortableError::MissingRuntime { .. } => "missing_runtime",
            PortableError::IncompleteRuntime { .. } => "incomplete_runtime",
            PortableError::MissingBroker { .. } => "missing_broker",
            PortableError::DataDirCreateFailed { .. } => "data_dir_create_failed",
            PortableError::ConfigWriteFailed { .. } => "config_write_failed",
            PortableError::ConsoleScriptWriteFailed { .. } => "console_script_write_failed",
            PortableError::ProcessSpawnFailed { .. } => "process_spawn_failed",
            PortableError::StopFailed(_) => "stop_failed",
            PortableError::ConfigError(_) => "config_error",
            PortableError::IoError(_) => "io_error",
            PortableError::TomlError(_) => "toml_error",
            PortableError::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortableError>;
