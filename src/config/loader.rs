// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Config file looked up in the base directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "Portable.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`, without validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.exists() {
        load_and_validate(path)
    } else {
        debug!(path = %path.display(), "no config file; using defaults");
        ConfigFile::try_from(RawConfigFile::default())
    }
}

pub fn default_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE_NAME)
}
