// src/bootstrap/mod.rs

//! Files and environment the broker needs before it can start.
//!
//! - [`env`] builds the variable set given to the broker and mirrored into
//!   the console script.
//! - [`runtime_config`] writes (and reads back) Erlang's `erl.ini`.
//! - [`console`] writes the interactive console script and launches it.

pub mod console;
pub mod env;
pub mod runtime_config;

pub use console::{ScriptFlavor, open_console, render_console_script, write_console_script};
pub use env::{BrokerEnvironment, REMOVED_VARIABLE};
pub use runtime_config::{
    RuntimeConfig, parse_runtime_config, render_runtime_config, write_runtime_config,
};
