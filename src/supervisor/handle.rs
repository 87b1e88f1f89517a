// src/supervisor/handle.rs

use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::bootstrap::BrokerEnvironment;
use crate::errors::{PortableError, Result};
use crate::output::{SinkSlot, StreamKind};

use super::streams::{ReadyWatch, spawn_line_reader};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// The running broker: child process and the environment it was started
/// with.
///
/// Only the supervisor holds one of these.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
    env: BrokerEnvironment,
}

impl ProcessHandle {
    /// Spawn the entrypoint with piped stdout/stderr. Nothing is read from
    /// the pipes until [`ProcessHandle::stream_output`] is called.
    pub fn spawn(entrypoint: &Path, env: BrokerEnvironment) -> Result<Self> {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(entrypoint);
            c
        } else {
            Command::new(entrypoint)
        };

        env.apply(&mut cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let mut child = cmd.spawn().map_err(|source| PortableError::ProcessSpawnFailed {
            path: entrypoint.to_path_buf(),
            source,
        })?;
        let pid = child.id();

        info!(pid = ?pid, entrypoint = %entrypoint.display(), "broker process spawned");

        Ok(Self { child, pid, env })
    }

    /// Start one reader task per output stream, forwarding lines into
    /// `sink`. Later calls find the pipes already taken and do nothing.
    pub fn stream_output(&mut self, sink: &SinkSlot, ready: Option<ReadyWatch>) {
        if let Some(stdout) = self.child.stdout.take() {
            spawn_line_reader(stdout, StreamKind::Stdout, sink.clone(), ready);
        }
        if let Some(stderr) = self.child.stderr.take() {
            spawn_line_reader(stderr, StreamKind::Stderr, sink.clone(), None);
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn env(&self) -> &BrokerEnvironment {
        &self.env
    }

    /// Non-blocking exit check.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    /// Hard-kill the child unless it already exited, and reap it.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        if let Some(status) = self.child.try_wait()? {
            debug!(pid = ?self.pid, %status, "broker process already exited");
            return Ok(());
        }
        self.child.kill().await?;
        info!(pid = ?self.pid, "broker process killed");
        Ok(())
    }
}
