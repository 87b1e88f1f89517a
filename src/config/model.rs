// src/config/model.rs

use regex::Regex;
use serde::Deserialize;

use crate::layout::DEFAULT_ENTRYPOINT;
use crate::supervisor::SupervisorOptions;

/// Top-level configuration as read from `Portable.toml`.
///
/// ```toml
/// [supervisor]
/// autostart = true
/// exit_on_start_failure = true
///
/// [broker]
/// entrypoint = "rabbitmq-server"
/// ready_pattern = "completed with \\d+ plugins"
///
/// [console]
/// enabled = true
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub broker: BrokerSection,

    #[serde(default)]
    pub console: ConsoleSection,
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// Start the broker as soon as the layout is prepared.
    #[serde(default = "default_true")]
    pub autostart: bool,

    /// Abort the run when the initial autostart fails.
    #[serde(default = "default_true")]
    pub exit_on_start_failure: bool,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            autostart: true,
            exit_on_start_failure: true,
        }
    }
}

/// `[broker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSection {
    /// Script stem under `<broker>/sbin`; `.bat` is appended on Windows.
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,

    /// Regex matched against broker stdout to detect readiness. An empty
    /// string disables detection.
    #[serde(default = "default_ready_pattern")]
    pub ready_pattern: String,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            entrypoint: default_entrypoint(),
            ready_pattern: default_ready_pattern(),
        }
    }
}

/// `[console]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleSection {
    /// Write the console script and allow the `console` command.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_entrypoint() -> String {
    DEFAULT_ENTRYPOINT.to_string()
}

fn default_ready_pattern() -> String {
    // RabbitMQ logs " Starting broker... completed with 3 plugins." once
    // listeners are up.
    r"completed with \d+ plugins".to_string()
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub supervisor: SupervisorSection,
    pub broker: BrokerSection,
    pub console: ConsoleSection,
    ready_pattern: Option<Regex>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, ready_pattern: Option<Regex>) -> Self {
        Self {
            supervisor: raw.supervisor,
            broker: raw.broker,
            console: raw.console,
            ready_pattern,
        }
    }

    pub fn ready_pattern(&self) -> Option<&Regex> {
        self.ready_pattern.as_ref()
    }

    pub fn supervisor_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            entrypoint: self.broker.entrypoint.clone(),
            ready_pattern: self.ready_pattern.clone(),
        }
    }
}
