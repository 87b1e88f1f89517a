// src/lib.rs

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod fs;
pub mod layout;
pub mod logging;
pub mod output;
pub mod process;
pub mod supervisor;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bootstrap::{BrokerEnvironment, write_console_script, write_runtime_config};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate, load_or_default};
use crate::controller::{ControlEvent, Controller, spawn_ctrl_c_listener, spawn_stdin_commands};
use crate::errors::PortableError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::layout::InstallationLayout;
use crate::output::ConsoleSink;
use crate::supervisor::Supervisor;

/// High-level entry point used by `main.rs`.
///
/// Startup order:
/// - resolve the installation layout (fatal on failure)
/// - load `Portable.toml`
/// - write `erl.ini` (fatal) and the console script (non-fatal)
/// - start the broker unless autostart is off
/// - hand control to the command loop until quit / Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => executable_dir()?,
    };

    let fs = RealFileSystem;
    let layout = layout::resolve(&fs, &base_dir)
        .with_context(|| format!("resolving installation in {}", base_dir.display()))?;

    let cfg = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => load_or_default(default_config_path(layout.base_dir()))?,
    };

    if args.dry_run {
        print_dry_run(&layout, &cfg);
        return Ok(());
    }

    let console_enabled = prepare_bootstrap_files(&fs, &layout, cfg.console.enabled)?;

    let mut supervisor = Supervisor::new(
        Arc::new(layout),
        cfg.supervisor_options(),
        Arc::new(ConsoleSink),
    );

    let autostart = cfg.supervisor.autostart && !args.no_autostart;
    if autostart && !supervisor.start().await && cfg.supervisor.exit_on_start_failure {
        bail!("broker failed to start");
    }

    let (tx, rx) = mpsc::channel::<ControlEvent>(16);
    let controller = Controller::new(supervisor, console_enabled, rx);
    spawn_ctrl_c_listener(tx.clone(), controller.console_gate());
    spawn_stdin_commands(tx, controller.console_gate());

    info!("type start, stop, restart, console, status or quit");
    controller.run().await;
    Ok(())
}

/// Write `erl.ini` and, when wanted, the console script.
///
/// Returns whether the console command is available. Fatal errors abort
/// startup; the rest only switch the console off.
pub fn prepare_bootstrap_files(
    fs: &dyn FileSystem,
    layout: &InstallationLayout,
    console_wanted: bool,
) -> std::result::Result<bool, PortableError> {
    write_runtime_config(fs, layout)?;
    if !console_wanted {
        return Ok(false);
    }
    match write_console_script(fs, layout) {
        Ok(_) => Ok(true),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(error = %e, label = e.as_label(), "console command disabled");
            Ok(false)
        }
    }
}

/// Directory containing the running executable; the default install root.
fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating current executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("current executable has no parent directory")
}

fn print_dry_run(layout: &InstallationLayout, cfg: &ConfigFile) {
    println!("rmq-portable dry-run");
    println!("{layout}");
    println!();

    println!("files:");
    println!("  {}", layout.runtime_config_path().display());
    if cfg.console.enabled {
        println!("  {}", layout.console_script_path().display());
    }
    println!(
        "  entrypoint: {}",
        layout.entrypoint_path(&cfg.broker.entrypoint).display()
    );
    println!();

    let env = BrokerEnvironment::from_layout(layout);
    println!("environment:");
    for (key, value) in env.vars() {
        println!("  {key}={value}");
    }
    for key in env.removed() {
        println!("  (unset {key})");
    }
}
