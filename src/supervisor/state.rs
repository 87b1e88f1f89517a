// src/supervisor/state.rs

use std::fmt;

/// Lifecycle of the supervised broker.
///
/// ```text
/// Idle -> Starting -> Running -> Stopping -> Idle
///            \-> Failed (spawn error; start may be retried)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
    Failed,
}

impl SupervisorState {
    /// `start()` is accepted from `Idle`, and from `Failed` as a retry.
    pub fn can_start(self) -> bool {
        matches!(self, SupervisorState::Idle | SupervisorState::Failed)
    }

    /// Nothing is (or may be) running.
    pub fn is_quiescent(self) -> bool {
        matches!(self, SupervisorState::Idle | SupervisorState::Failed)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::Stopping => "stopping",
            SupervisorState::Failed => "failed",
        };
        f.write_str(s)
    }
}
