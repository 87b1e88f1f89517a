use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use rmq_portable::process::{Pid, ProcessEntry, ProcessTable};

#[derive(Debug, Default)]
struct FakeState {
    processes: BTreeMap<Pid, std::result::Result<PathBuf, String>>,
    kill_errors: HashMap<Pid, String>,
    listing_error: Option<String>,
    killed: Vec<Pid>,
}

/// In-memory process table.
///
/// - `terminate` removes the process and records the pid, unless a kill
///   error was configured for it.
/// - `processes` fails as a whole when a listing error is configured.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessTable {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(self, pid: Pid, exe: impl Into<PathBuf>) -> Self {
        self.state.lock().unwrap().processes.insert(pid, Ok(exe.into()));
        self
    }

    /// A process whose executable path cannot be read.
    pub fn with_unreadable(self, pid: Pid, error: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .processes
            .insert(pid, Err(error.to_string()));
        self
    }

    pub fn failing_kill(self, pid: Pid, error: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .kill_errors
            .insert(pid, error.to_string());
        self
    }

    pub fn failing_listing(self, error: &str) -> Self {
        self.state.lock().unwrap().listing_error = Some(error.to_string());
        self
    }

    pub fn killed(&self) -> Vec<Pid> {
        self.state.lock().unwrap().killed.clone()
    }

    pub fn is_alive(&self, pid: Pid) -> bool {
        self.state.lock().unwrap().processes.contains_key(&pid)
    }
}

impl ProcessTable for FakeProcessTable {
    fn processes(&self) -> Result<Vec<ProcessEntry>> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.listing_error {
            return Err(anyhow!("{err}"));
        }
        Ok(state
            .processes
            .iter()
            .map(|(pid, exe)| ProcessEntry {
                pid: *pid,
                executable: exe.clone(),
            })
            .collect())
    }

    fn terminate(&self, pid: Pid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.kill_errors.get(&pid) {
            return Err(anyhow!("{err}"));
        }
        state.processes.remove(&pid);
        state.killed.push(pid);
        Ok(())
    }
}
