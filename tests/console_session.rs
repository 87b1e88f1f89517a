// tests/console_session.rs
//
// The console script is a plain `sh` stand-in here, so Unix only.
#![cfg(unix)]

mod common;
use crate::common::{InstallTreeBuilder, init_tracing, resolve_tree};

use std::fs;
use std::sync::Arc;

use rmq_portable::bootstrap::open_console;
use rmq_portable::controller::{ControlCommand, Controller};
use rmq_portable::supervisor::{Supervisor, SupervisorOptions, SupervisorState};
use rmq_portable_test_utils::fake_process::FakeProcessTable;
use rmq_portable_test_utils::sink::RecordingSink;
use rmq_portable_test_utils::with_timeout;
use tokio::sync::mpsc;

#[tokio::test]
async fn console_runs_from_sbin() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    tree.write_console_stand_in("pwd -P > console-ran");
    let layout = resolve_tree(&tree);

    let mut child = open_console(&layout).expect("console spawns");
    let status = with_timeout(child.wait()).await.unwrap();
    assert!(status.success());

    let cwd = fs::read_to_string(layout.sbin_dir().join("console-ran")).unwrap();
    assert_eq!(cwd.trim(), layout.sbin_dir().to_str().unwrap());
}

#[tokio::test]
async fn console_holds_the_terminal_until_it_exits() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    tree.write_console_stand_in("sleep 0.3\npwd -P > console-ran");
    let sink = RecordingSink::new();
    let sup = Supervisor::new(
        resolve_tree(&tree),
        SupervisorOptions::default(),
        Arc::new(sink.clone()),
    )
    .with_process_table(Arc::new(FakeProcessTable::new()));
    let (_tx, rx) = mpsc::channel(8);
    let mut controller = Controller::new(sup, true, rx);
    let gate = controller.console_gate();

    assert!(controller.handle(ControlCommand::Console).await);

    assert!(gate.is_held());
    assert!(!controller.supervisor().has_sink(), "broker output must not reach the console");

    with_timeout(gate.released()).await;
    assert!(controller.supervisor().has_sink());
    assert!(tree.sbin_dir().join("console-ran").exists());

    // The console is not the broker: nothing is tracked for it.
    assert_eq!(controller.supervisor().pid(), None);
    assert_eq!(controller.supervisor().state(), SupervisorState::Idle);
}

#[tokio::test]
async fn missing_console_script_releases_the_gate() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let sup = Supervisor::new(
        resolve_tree(&tree),
        SupervisorOptions::default(),
        Arc::new(RecordingSink::new()),
    )
    .with_process_table(Arc::new(FakeProcessTable::new()));
    let (_tx, rx) = mpsc::channel(8);
    let mut controller = Controller::new(sup, true, rx);
    let gate = controller.console_gate();
    gate.hold();

    assert!(controller.handle(ControlCommand::Console).await);

    assert!(!gate.is_held());
    assert!(controller.supervisor().has_sink());
}
