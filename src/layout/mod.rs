// src/layout/mod.rs

//! Installation layout discovery.
//!
//! A portable install is a base directory holding an Erlang runtime
//! (`erl*`), a RabbitMQ distribution (`rabbit*`) and a `data` directory.
//!
//! - [`matcher`] classifies directory names (pure, no IO).
//! - [`resolver`] scans the base directory once and produces an
//!   [`InstallationLayout`].

pub mod matcher;
pub mod resolver;

use std::fmt;
use std::path::{Path, PathBuf};

pub use matcher::{EntryKind, classify, is_support_dir};
pub use resolver::resolve;

/// Name of the Erlang bootstrap file, relative to `<runtime>/bin`.
pub const RUNTIME_CONFIG_NAME: &str = "erl.ini";

/// Default broker entrypoint script name under `<broker>/sbin`, without the
/// platform suffix.
pub const DEFAULT_ENTRYPOINT: &str = "rabbitmq-server";

#[cfg(windows)]
pub const CONSOLE_SCRIPT_NAME: &str = "startShell.bat";
#[cfg(not(windows))]
pub const CONSOLE_SCRIPT_NAME: &str = "startShell.sh";

/// The resolved set of directories used for the remainder of a run.
///
/// A value of this type only exists once every directory is known, and it is
/// never mutated afterwards; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationLayout {
    base_dir: PathBuf,
    runtime_dir: PathBuf,
    runtime_bin_dir: PathBuf,
    broker_dir: PathBuf,
    data_dir: PathBuf,
}

impl InstallationLayout {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        runtime_dir: impl Into<PathBuf>,
        runtime_bin_dir: impl Into<PathBuf>,
        broker_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            runtime_dir: runtime_dir.into(),
            runtime_bin_dir: runtime_bin_dir.into(),
            broker_dir: broker_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Erlang root (`erl*`).
    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Execution-support directory (`erl*/erts-*/bin`).
    pub fn runtime_bin_dir(&self) -> &Path {
        &self.runtime_bin_dir
    }

    /// RabbitMQ root (`rabbit*`).
    pub fn broker_dir(&self) -> &Path {
        &self.broker_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sbin_dir(&self) -> PathBuf {
        self.broker_dir.join("sbin")
    }

    /// `<runtime>/bin/erl.ini`
    pub fn runtime_config_path(&self) -> PathBuf {
        self.runtime_dir.join("bin").join(RUNTIME_CONFIG_NAME)
    }

    pub fn console_script_path(&self) -> PathBuf {
        self.sbin_dir().join(CONSOLE_SCRIPT_NAME)
    }

    /// Platform entrypoint for the given script stem (`.bat` on Windows).
    pub fn entrypoint_path(&self, stem: &str) -> PathBuf {
        if cfg!(windows) {
            self.sbin_dir().join(format!("{stem}.bat"))
        } else {
            self.sbin_dir().join(stem)
        }
    }
}

impl fmt::Display for InstallationLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "base:    {}", self.base_dir.display())?;
        writeln!(f, "erlang:  {}", self.runtime_dir.display())?;
        writeln!(f, "erts:    {}", self.runtime_bin_dir.display())?;
        writeln!(f, "rabbit:  {}", self.broker_dir.display())?;
        write!(f, "data:    {}", self.data_dir.display())
    }
}
