// src/supervisor/mod.rs

//! Lifecycle supervision of the broker process.
//!
//! The [`Supervisor`] owns the state machine, the running child and the
//! shared layout; everything else here is a building block:
//!
//! - [`state`] is the lifecycle state enum.
//! - [`handle`] spawns the broker and owns the child process.
//! - [`streams`] pumps the child's stdout/stderr into the output sink.
//! - [`core`] ties it together: start, stop (with orphan sweep), restart.

pub mod core;
pub mod handle;
pub mod state;
pub mod streams;

use regex::Regex;

use crate::layout::DEFAULT_ENTRYPOINT;

pub use self::core::Supervisor;
pub use handle::ProcessHandle;
pub use state::SupervisorState;

/// Startup notice emitted into the sink after a successful spawn.
pub const STARTED_NOTICE: &str = " Server started ... ";
/// Notice emitted into the sink at the end of every stop.
pub const STOPPED_NOTICE: &str = " Server stopped ... ";

/// Knobs for the supervisor, usually derived from the config file.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Entrypoint script stem under `<broker>/sbin`.
    pub entrypoint: String,
    /// Stdout line that marks the broker as ready to accept connections.
    pub ready_pattern: Option<Regex>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            ready_pattern: None,
        }
    }
}
