// src/supervisor/core.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::bootstrap::BrokerEnvironment;
use crate::errors::PortableError;
use crate::layout::InstallationLayout;
use crate::output::{OutputEvent, OutputSink, SinkSlot};
use crate::process::{OsProcessTable, Pid, ProcessTable, SweepReport, sweep_orphans};

use super::handle::ProcessHandle;
use super::state::SupervisorState;
use super::streams::ReadyWatch;
use super::{STARTED_NOTICE, STOPPED_NOTICE, SupervisorOptions};

/// Owns the broker's lifecycle for one run.
///
/// Lifecycle commands take `&mut self`, so they are serialized by
/// construction. Output flows to the attached sink from background reader
/// tasks and needs no further coordination.
pub struct Supervisor {
    layout: Arc<InstallationLayout>,
    options: SupervisorOptions,
    processes: Arc<dyn ProcessTable>,
    sink: SinkSlot,
    state: SupervisorState,
    handle: Option<ProcessHandle>,
    ready: Arc<AtomicBool>,
    last_sweep: Option<SweepReport>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("state", &self.state)
            .field("pid", &self.pid())
            .field("runtime_dir", &self.layout.runtime_dir())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(
        layout: Arc<InstallationLayout>,
        options: SupervisorOptions,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            layout,
            options,
            processes: Arc::new(OsProcessTable),
            sink: SinkSlot::new(sink),
            state: SupervisorState::Idle,
            handle: None,
            ready: Arc::new(AtomicBool::new(false)),
            last_sweep: None,
        }
    }

    /// Replace the process table used by the orphan sweep.
    pub fn with_process_table(mut self, processes: Arc<dyn ProcessTable>) -> Self {
        self.processes = processes;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn layout(&self) -> &InstallationLayout {
        &self.layout
    }

    pub fn pid(&self) -> Option<Pid> {
        self.handle.as_ref().and_then(ProcessHandle::pid)
    }

    pub fn is_running(&self) -> bool {
        self.state == SupervisorState::Running
    }

    /// Whether the configured ready pattern has been seen on stdout since the
    /// last start. Always `false` when no pattern is configured.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Whether the tracked child has exited on its own. The supervisor stays
    /// `Running` until `stop()` is called, so that leftovers still get swept.
    pub fn child_exited(&mut self) -> bool {
        self.handle.as_mut().is_some_and(ProcessHandle::has_exited)
    }

    /// Environment given to the current child, if any.
    pub fn child_env(&self) -> Option<&BrokerEnvironment> {
        self.handle.as_ref().map(ProcessHandle::env)
    }

    pub fn last_sweep(&self) -> Option<&SweepReport> {
        self.last_sweep.as_ref()
    }

    pub fn attach_sink(&self, sink: Arc<dyn OutputSink>) {
        self.sink.attach(sink);
    }

    pub fn detach_sink(&self) -> Option<Arc<dyn OutputSink>> {
        self.sink.detach()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_attached()
    }

    /// Shared handle to the sink slot, for re-attaching a sink from a task
    /// that does not own the supervisor.
    pub fn sink_slot(&self) -> SinkSlot {
        self.sink.clone()
    }

    /// Start the broker.
    ///
    /// Returns `false` without spawning anything unless the supervisor is
    /// idle (or failed). A spawn error leaves the supervisor `Failed` and is
    /// also pushed to the sink on the stderr stream.
    pub async fn start(&mut self) -> bool {
        if !self.state.can_start() {
            warn!(state = %self.state, "start ignored: broker is not idle");
            return false;
        }
        self.transition(SupervisorState::Starting);

        let env = BrokerEnvironment::from_layout(&self.layout);
        let entrypoint = self.layout.entrypoint_path(&self.options.entrypoint);

        self.ready.store(false, Ordering::SeqCst);
        let ready = self.options.ready_pattern.clone().map(|pattern| ReadyWatch {
            pattern,
            ready: Arc::clone(&self.ready),
        });

        match ProcessHandle::spawn(&entrypoint, env) {
            Ok(mut handle) => {
                self.transition(SupervisorState::Running);
                // The notice goes out before any broker line can.
                self.sink.emit(OutputEvent::stdout(STARTED_NOTICE));
                handle.stream_output(&self.sink, ready);
                self.handle = Some(handle);
                true
            }
            Err(err) => {
                error!(error = %err, label = err.as_label(), "error starting server");
                self.transition(SupervisorState::Failed);
                self.sink.emit(OutputEvent::stderr(err.to_string()));
                false
            }
        }
    }

    /// Stop the broker and sweep any Erlang processes it left behind.
    ///
    /// Always ends `Idle`. Returns `false` when the child could not be killed
    /// or the process table could not be read; per-process sweep failures do
    /// not count and are available through [`Supervisor::last_sweep`].
    pub async fn stop(&mut self) -> bool {
        if self.state.is_quiescent() && self.handle.is_none() {
            debug!(state = %self.state, "stop requested with nothing running");
            self.transition(SupervisorState::Idle);
            return true;
        }
        self.transition(SupervisorState::Stopping);

        let mut failure: Option<String> = None;
        let mut skip = vec![std::process::id()];

        if let Some(mut handle) = self.handle.take() {
            skip.extend(handle.pid());
            if let Err(e) = handle.kill().await {
                error!(pid = ?handle.pid(), error = %e, "cannot kill broker process");
                failure = Some(format!("killing broker process: {e}"));
            }
        }

        match self.sweep(skip).await {
            Ok(report) => {
                info!(
                    killed = report.killed.len(),
                    failures = report.failures.len(),
                    "orphan sweep finished"
                );
                self.last_sweep = Some(report);
            }
            Err(e) => {
                error!(error = %e, "orphan sweep could not run");
                self.last_sweep = None;
                failure.get_or_insert_with(|| format!("sweeping leftover processes: {e:#}"));
            }
        }

        self.ready.store(false, Ordering::SeqCst);
        self.transition(SupervisorState::Idle);
        self.sink.emit(OutputEvent::stdout(STOPPED_NOTICE));

        match failure {
            None => true,
            Some(reason) => {
                let err = PortableError::StopFailed(reason);
                self.sink.emit(OutputEvent::stderr(err.to_string()));
                false
            }
        }
    }

    /// `stop()` then `start()`. The start is attempted even if the stop
    /// reported a failure, since stop always leaves the supervisor idle.
    pub async fn restart(&mut self) -> bool {
        let stopped = self.stop().await;
        let started = self.start().await;
        stopped && started
    }

    async fn sweep(&self, skip: Vec<Pid>) -> anyhow::Result<SweepReport> {
        let table = Arc::clone(&self.processes);
        let root: PathBuf = self.layout.runtime_dir().to_path_buf();
        tokio::task::spawn_blocking(move || sweep_orphans(table.as_ref(), &root, &skip)).await?
    }

    fn transition(&mut self, next: SupervisorState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "supervisor state change");
            self.state = next;
        }
    }
}
