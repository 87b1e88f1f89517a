// src/controller.rs

//! Command loop driving the supervisor.
//!
//! The controller is the stand-in for a presentation layer: it receives
//! [`ControlEvent`]s (typed commands from stdin, Ctrl-C) and turns them into
//! supervisor calls, one at a time. Commands that make no sense in the
//! current state are refused here, the way a GUI would grey out its menu
//! items.
//!
//! On Unix the console shares this terminal. While it is open the stdin
//! reader stops reading, broker output is held back from the terminal, and
//! Ctrl-C belongs to the console; the [`ConsoleGate`] carries that state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bootstrap::open_console;
use crate::supervisor::Supervisor;

/// A user-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    Restart,
    Console,
    Status,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(ControlCommand::Start),
            "stop" => Ok(ControlCommand::Stop),
            "restart" => Ok(ControlCommand::Restart),
            "console" | "shell" => Ok(ControlCommand::Console),
            "status" => Ok(ControlCommand::Status),
            "quit" | "exit" => Ok(ControlCommand::Quit),
            other => Err(format!(
                "unknown command '{other}' (expected start, stop, restart, console, status or quit)"
            )),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlCommand::Start => "start",
            ControlCommand::Stop => "stop",
            ControlCommand::Restart => "restart",
            ControlCommand::Console => "console",
            ControlCommand::Status => "status",
            ControlCommand::Quit => "quit",
        };
        f.write_str(s)
    }
}

/// Events flowing into the controller.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    Command(ControlCommand),
    /// Ctrl-C or similar; stop the broker and leave.
    ShutdownRequested,
}

/// Whether an interactive console currently owns the terminal.
#[derive(Debug, Clone)]
pub struct ConsoleGate {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ConsoleGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn hold(&self) {
        self.tx.send_replace(true);
    }

    pub fn release(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_held(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the gate is (or becomes) released.
    pub async fn released(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this cannot see a closed channel.
        let _ = rx.wait_for(|held| !*held).await;
    }
}

pub struct Controller {
    supervisor: Supervisor,
    console_enabled: bool,
    console_gate: ConsoleGate,
    event_rx: mpsc::Receiver<ControlEvent>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("supervisor", &self.supervisor)
            .field("console_enabled", &self.console_enabled)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn new(
        supervisor: Supervisor,
        console_enabled: bool,
        event_rx: mpsc::Receiver<ControlEvent>,
    ) -> Self {
        Self {
            supervisor,
            console_enabled,
            console_gate: ConsoleGate::new(),
            event_rx,
        }
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Gate shared with the stdin reader and the Ctrl-C listener.
    pub fn console_gate(&self) -> ConsoleGate {
        self.console_gate.clone()
    }

    /// Main loop. Returns the supervisor once a quit / shutdown was handled
    /// (the broker is stopped by then) or the event channel closed.
    pub async fn run(mut self) -> Supervisor {
        info!("controller started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "controller received event");
            let keep_running = match event {
                ControlEvent::Command(command) => self.handle(command).await,
                ControlEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    false
                }
            };
            if !keep_running {
                break;
            }
        }

        if !self.supervisor.stop().await {
            warn!("broker did not stop cleanly");
        }
        info!("controller exiting");
        self.supervisor
    }

    /// Handle one command. Returns `false` when the loop should end.
    pub async fn handle(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::Start => {
                if self.supervisor.is_running() {
                    warn!("server is already running");
                } else {
                    self.supervisor.start().await;
                }
            }
            ControlCommand::Stop => {
                if self.supervisor.state().is_quiescent() {
                    warn!("server is not running");
                } else {
                    self.supervisor.stop().await;
                }
            }
            ControlCommand::Restart => {
                self.supervisor.restart().await;
            }
            ControlCommand::Console => self.launch_console(),
            ControlCommand::Status => self.report_status(),
            ControlCommand::Quit => return false,
        }
        true
    }

    /// Launch the console and hand it the terminal until it exits. The
    /// gate is released on every path, or the stdin reader would stay
    /// paused for good.
    fn launch_console(&mut self) {
        if !self.console_enabled {
            warn!("console is disabled");
            self.console_gate.release();
            return;
        }

        self.console_gate.hold();
        let mut child = match open_console(self.supervisor.layout()) {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, "cannot open console");
                self.console_gate.release();
                return;
            }
        };

        let parked = self.supervisor.detach_sink();
        let slot = self.supervisor.sink_slot();
        let gate = self.console_gate.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(%status, "console closed"),
                Err(e) => warn!(error = %e, "lost track of console process"),
            }
            if let Some(sink) = parked {
                slot.attach(sink);
            }
            gate.release();
        });
    }

    fn report_status(&mut self) {
        let exited = self.supervisor.child_exited();
        info!(
            state = %self.supervisor.state(),
            pid = ?self.supervisor.pid(),
            ready = self.supervisor.is_ready(),
            child_exited = exited,
            last_sweep = ?self.supervisor.last_sweep(),
            "status"
        );
    }
}

/// Forward Ctrl-C into the controller. While the console is open the
/// interrupt was meant for the console and is ignored here.
pub fn spawn_ctrl_c_listener(tx: mpsc::Sender<ControlEvent>, gate: ConsoleGate) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            if gate.is_held() {
                debug!("Ctrl+C ignored while the console is open");
                continue;
            }
            let _ = tx.send(ControlEvent::ShutdownRequested).await;
            return;
        }
    });
}

/// Read commands line by line from stdin. EOF ends the reader, not the run.
pub fn spawn_stdin_commands(tx: mpsc::Sender<ControlEvent>, gate: ConsoleGate) {
    spawn_command_reader(tokio::io::stdin(), tx, gate);
}

/// Read commands line by line from `input`.
///
/// After a `console` command no further line is read until the gate is
/// released, so the console's shell gets every keystroke.
pub fn spawn_command_reader<R>(
    input: R,
    tx: mpsc::Sender<ControlEvent>,
    gate: ConsoleGate,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<ControlCommand>() {
                Ok(command) => command,
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            };

            let opens_console = command == ControlCommand::Console;
            if opens_console {
                gate.hold();
            }
            if tx.send(ControlEvent::Command(command)).await.is_err() {
                break;
            }
            if opens_console {
                gate.released().await;
            }
        }
        debug!("command reader finished");
    })
}
