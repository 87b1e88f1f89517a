// src/process/sweep.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::table::{Pid, ProcessTable};

/// A process that could not be inspected or killed during a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub pid: Pid,
    pub error: String,
}

/// Outcome of one orphan sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub killed: Vec<Pid>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Kill every process whose executable lives under `runtime_dir`.
///
/// Processes in `skip` are never touched. A process whose path cannot be
/// read, or that refuses to die, is recorded in the report and the sweep
/// moves on. Only a failure to list processes at all is returned as `Err`.
pub fn sweep_orphans(
    table: &dyn ProcessTable,
    runtime_dir: &Path,
    skip: &[Pid],
) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    for entry in table.processes()? {
        if skip.contains(&entry.pid) {
            continue;
        }

        let exe = match entry.executable {
            Ok(exe) => exe,
            Err(error) => {
                debug!(pid = entry.pid, %error, "cannot read executable path");
                report.failures.push(SweepFailure {
                    pid: entry.pid,
                    error,
                });
                continue;
            }
        };

        if !is_under(&exe, runtime_dir) {
            continue;
        }

        info!(pid = entry.pid, path = %exe.display(), "force killing leftover erlang process");
        match table.terminate(entry.pid) {
            Ok(()) => report.killed.push(entry.pid),
            Err(e) => {
                warn!(pid = entry.pid, path = %exe.display(), error = %e, "cannot kill process");
                report.failures.push(SweepFailure {
                    pid: entry.pid,
                    error: format!("{e:#}"),
                });
            }
        }
    }

    if !report.failures.is_empty() {
        warn!(
            failures = report.failures.len(),
            killed = report.killed.len(),
            "orphan sweep skipped processes it could not inspect or kill"
        );
    }

    Ok(report)
}

/// Whether `path` lies inside `root`, compared by whole components so that
/// `erl23` is not a prefix of `erl234`. Case-insensitive on Windows.
pub fn is_under(path: &Path, root: &Path) -> bool {
    if cfg!(windows) {
        fold_case(path).starts_with(fold_case(root))
    } else {
        path.starts_with(root)
    }
}

fn fold_case(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}
