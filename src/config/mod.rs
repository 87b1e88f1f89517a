// src/config/mod.rs

//! Optional `Portable.toml` configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values that serde cannot check on its own (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{CONFIG_FILE_NAME, default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{BrokerSection, ConfigFile, ConsoleSection, RawConfigFile, SupervisorSection};
