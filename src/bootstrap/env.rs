// src/bootstrap/env.rs

use std::path::{MAIN_SEPARATOR, Path};

use crate::layout::InstallationLayout;

/// Inherited variable that is stripped from the broker's environment. Some
/// shells and tools export `LOGS` for their own purposes, and RabbitMQ's
/// scripts pick it up as the log file location.
pub const REMOVED_VARIABLE: &str = "LOGS";

/// Drive used for `HOMEDRIVE` when the install path has no drive letter.
const FALLBACK_DRIVE: &str = "C:";

/// Environment for the supervised broker and for the console script.
///
/// Both consumers are built from the same value so the console always sees
/// exactly what the server sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEnvironment {
    vars: Vec<(String, String)>,
    removed: Vec<String>,
}

impl BrokerEnvironment {
    pub fn from_layout(layout: &InstallationLayout) -> Self {
        let data = layout.data_dir();
        let (home_drive, home_path) = home_identity(data);

        let mut vars = vec![
            ("ERLANG_HOME".to_string(), with_trailing_separator(layout.runtime_dir())),
            ("RABBITMQ_BASE".to_string(), with_trailing_separator(data)),
            ("RABBITMQ_CONFIG_FILE".to_string(), display(&data.join("config"))),
            ("RABBITMQ_ADVANCED_CONFIG_FILE".to_string(), display(&data.join("config"))),
            ("RABBITMQ_LOG_BASE".to_string(), display(&data.join("log"))),
            // Erlang locates its cookie file through these.
            ("HOMEDRIVE".to_string(), home_drive),
            ("HOMEPATH".to_string(), home_path),
        ];

        if cfg!(unix) {
            vars.push(("HOME".to_string(), display(data)));
        }

        Self {
            vars,
            removed: vec![REMOVED_VARIABLE.to_string()],
        }
    }

    /// Variables to set, in a stable order.
    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }

    /// Variables to remove from the inherited environment.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Apply this environment on top of the inherited one.
    pub fn apply(&self, cmd: &mut tokio::process::Command) {
        for key in &self.removed {
            cmd.env_remove(key);
        }
        cmd.envs(self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn with_trailing_separator(path: &Path) -> String {
    let mut s = display(path);
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

/// Split a data directory into `HOMEDRIVE` / `HOMEPATH`.
///
/// `D:\tools\rabbit\data` becomes (`D:`, `\tools\rabbit\data\`). Paths
/// without a drive letter fall back to (`C:`, `\`).
fn home_identity(data_dir: &Path) -> (String, String) {
    let s = display(data_dir);
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let (drive, rest) = s.split_at(2);
        let mut rest = rest.to_string();
        if !rest.ends_with('\\') {
            rest.push('\\');
        }
        (drive.to_string(), rest)
    } else {
        (FALLBACK_DRIVE.to_string(), "\\".to_string())
    }
}
