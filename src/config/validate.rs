// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PortableError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PortableError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_entrypoint(&raw.broker.entrypoint)?;
        let ready_pattern = compile_ready_pattern(&raw.broker.ready_pattern)?;
        Ok(ConfigFile::new_unchecked(raw, ready_pattern))
    }
}

fn validate_entrypoint(entrypoint: &str) -> Result<()> {
    if entrypoint.trim().is_empty() {
        return Err(PortableError::ConfigError(
            "[broker].entrypoint must not be empty".to_string(),
        ));
    }
    if entrypoint.contains(['/', '\\']) {
        return Err(PortableError::ConfigError(format!(
            "[broker].entrypoint must be a script name inside sbin, not a path (got '{entrypoint}')"
        )));
    }
    Ok(())
}

fn compile_ready_pattern(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern).map(Some).map_err(|e| {
        PortableError::ConfigError(format!("[broker].ready_pattern is not a valid regex: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert!(cfg.supervisor.autostart);
        assert!(cfg.console.enabled);
        assert_eq!(cfg.broker.entrypoint, "rabbitmq-server");
        assert!(cfg
            .ready_pattern()
            .unwrap()
            .is_match(" Starting broker... completed with 3 plugins."));
    }

    #[test]
    fn empty_pattern_disables_ready_detection() {
        let mut raw = RawConfigFile::default();
        raw.broker.ready_pattern = String::new();
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert!(cfg.ready_pattern().is_none());
        assert!(cfg.supervisor_options().ready_pattern.is_none());
    }

    #[test]
    fn entrypoint_must_be_a_bare_name() {
        let mut raw = RawConfigFile::default();
        raw.broker.entrypoint = "../evil".to_string();
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(PortableError::ConfigError(msg)) if msg.contains("entrypoint")
        ));
    }
}
