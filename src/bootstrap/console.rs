// src/bootstrap/console.rs

//! The "open console" helper script.
//!
//! The script exports the broker environment and then drops into an
//! interactive shell, so `rabbitmqctl` and friends work against the portable
//! node. It is launched on demand and never supervised: the broker's
//! lifecycle ignores it, and only the command loop watches for it to close.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::errors::{PortableError, Result};
use crate::fs::FileSystem;
use crate::layout::InstallationLayout;

use super::env::BrokerEnvironment;

/// Shell dialect of the console script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    /// `cmd.exe` batch file.
    Batch,
    /// POSIX `sh` script.
    Posix,
}

impl ScriptFlavor {
    pub fn native() -> Self {
        if cfg!(windows) {
            ScriptFlavor::Batch
        } else {
            ScriptFlavor::Posix
        }
    }
}

pub fn render_console_script(env: &BrokerEnvironment, flavor: ScriptFlavor) -> String {
    let mut out = String::new();
    match flavor {
        ScriptFlavor::Batch => {
            out.push_str("@setlocal\n");
            for (key, value) in env.vars() {
                out.push_str(&format!("@set {key}={value}\n"));
            }
            for key in env.removed() {
                out.push_str(&format!("@set {key}=\n"));
            }
            out.push_str("@cmd.exe\n");
        }
        ScriptFlavor::Posix => {
            out.push_str("#!/bin/sh\n");
            for (key, value) in env.vars() {
                out.push_str(&format!("export {key}={}\n", sh_quote(value)));
            }
            for key in env.removed() {
                out.push_str(&format!("unset {key}\n"));
            }
            out.push_str("exec \"${SHELL:-/bin/sh}\" -i\n");
        }
    }
    out
}

/// Write the console script into `<broker>/sbin`.
///
/// Failure only disables the console command; callers should log it and
/// carry on.
pub fn write_console_script(fs: &dyn FileSystem, layout: &InstallationLayout) -> Result<PathBuf> {
    let path = layout.console_script_path();
    let flavor = ScriptFlavor::native();
    let script = render_console_script(&BrokerEnvironment::from_layout(layout), flavor);

    let written = fs.write(&path, script.as_bytes()).and_then(|()| {
        if flavor == ScriptFlavor::Posix {
            fs.set_executable(&path)
        } else {
            Ok(())
        }
    });

    written.map_err(|e| PortableError::ConsoleScriptWriteFailed {
        path: path.clone(),
        reason: format!("{e:#}"),
    })?;

    info!(path = %path.display(), "wrote console script");
    Ok(path)
}

/// Launch the console script from `<broker>/sbin`.
///
/// On Windows the script gets its own window and the returned child (the
/// `start` wrapper) exits at once. Elsewhere the script shares this terminal,
/// so the caller must keep off stdin until the child exits. The child is
/// not killed on drop and outlives a broker stop.
pub fn open_console(layout: &InstallationLayout) -> Result<Child> {
    let script = layout.console_script_path();

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg("start").arg("rabbitmq console").arg(&script);
        c
    } else {
        Command::new(&script)
    };

    cmd.current_dir(layout.sbin_dir())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    match cmd.spawn() {
        Ok(child) => {
            info!(pid = ?child.id(), script = %script.display(), "console started");
            Ok(child)
        }
        Err(source) => {
            warn!(script = %script.display(), error = %source, "cannot start console");
            Err(PortableError::ProcessSpawnFailed {
                path: script,
                source,
            })
        }
    }
}

fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
