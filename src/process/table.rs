// src/process/table.rs

use std::fmt::Debug;
use std::path::PathBuf;

use anyhow::Result;

pub type Pid = u32;

/// One process as seen by a [`ProcessTable`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: Pid,
    /// Full executable path, or why it could not be read.
    pub executable: std::result::Result<PathBuf, String>,
}

/// Capability to list processes and terminate them by id.
///
/// Production code uses [`OsProcessTable`]; tests substitute a fake so the
/// sweep never touches real processes.
pub trait ProcessTable: Send + Sync + Debug {
    /// Snapshot of all processes visible to us. An `Err` means the table
    /// itself could not be read; per-process problems go into
    /// [`ProcessEntry::executable`].
    fn processes(&self) -> Result<Vec<ProcessEntry>>;

    /// Forcibly terminate a process. No graceful signal is sent first.
    fn terminate(&self, pid: Pid) -> Result<()>;
}

/// Process table backed by the operating system.
///
/// - Linux: `/proc/<pid>/exe`, `kill(SIGKILL)`.
/// - Other Unix: `ps -axo pid=,comm=`, `kill(SIGKILL)`.
/// - Windows: `Win32_Process` via PowerShell, `taskkill /F`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessTable;

impl ProcessTable for OsProcessTable {
    fn processes(&self) -> Result<Vec<ProcessEntry>> {
        imp::processes()
    }

    fn terminate(&self, pid: Pid) -> Result<()> {
        imp::terminate(pid)
    }
}

#[cfg(unix)]
fn kill_pid(pid: Pid) -> Result<()> {
    use anyhow::Context;

    let raw = libc::pid_t::try_from(pid).with_context(|| format!("pid {pid} out of range"))?;

    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        // Exited between the snapshot and the kill.
        return Ok(());
    }
    Err(anyhow::Error::new(err).context(format!("kill({pid}, SIGKILL)")))
}

#[cfg(target_os = "linux")]
mod imp {
    use std::ffi::OsString;
    use std::fs;
    use std::io::{self, ErrorKind};
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use tracing::debug;

    use super::{Pid, ProcessEntry};

    pub fn processes() -> Result<Vec<ProcessEntry>> {
        let listing = fs::read_dir("/proc")
            .context("reading /proc")?
            .map(|entry| entry.map(|e| (e.file_name(), e.path())));
        Ok(collect_entries(listing))
    }

    /// Build the snapshot from `/proc` children. A child that cannot be
    /// read is skipped so that the rest of the table is still swept.
    pub(super) fn collect_entries<I>(listing: I) -> Vec<ProcessEntry>
    where
        I: IntoIterator<Item = io::Result<(OsString, PathBuf)>>,
    {
        let mut entries = Vec::new();
        for item in listing {
            let (name, dir) = match item {
                Ok(item) => item,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable /proc entry");
                    continue;
                }
            };
            let Some(pid) = name.to_str().and_then(|n| n.parse::<Pid>().ok()) else {
                continue;
            };

            match fs::read_link(dir.join("exe")) {
                Ok(exe) => entries.push(ProcessEntry {
                    pid,
                    executable: Ok(strip_deleted_suffix(&exe)),
                }),
                // Kernel threads have no exe link, and short-lived processes
                // may be gone by now.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => entries.push(ProcessEntry {
                    pid,
                    executable: Err(e.to_string()),
                }),
            }
        }
        entries
    }

    pub fn terminate(pid: Pid) -> Result<()> {
        super::kill_pid(pid)
    }

    /// The link target of a replaced binary reads `/path/beam.smp (deleted)`.
    fn strip_deleted_suffix(exe: &Path) -> PathBuf {
        match exe.to_str().and_then(|s| s.strip_suffix(" (deleted)")) {
            Some(stripped) => stripped.into(),
            None => exe.to_path_buf(),
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
mod imp {
    use std::path::PathBuf;
    use std::process::Command;

    use anyhow::{Context, Result, bail};

    use super::{Pid, ProcessEntry};

    pub fn processes() -> Result<Vec<ProcessEntry>> {
        let output = Command::new("ps")
            .args(["-axo", "pid=,comm="])
            .output()
            .context("running ps")?;
        if !output.status.success() {
            bail!("ps exited with {}", output.status);
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .filter_map(|line| {
                let (pid, comm) = line.trim().split_once(char::is_whitespace)?;
                let pid = pid.parse::<Pid>().ok()?;
                let comm = comm.trim();
                let executable = if comm.starts_with('/') {
                    Ok(PathBuf::from(comm))
                } else {
                    Err(format!("no absolute executable path ({comm})"))
                };
                Some(ProcessEntry { pid, executable })
            })
            .collect())
    }

    pub fn terminate(pid: Pid) -> Result<()> {
        super::kill_pid(pid)
    }
}

#[cfg(windows)]
mod imp {
    use std::path::PathBuf;
    use std::process::Command;

    use anyhow::{Context, Result, bail};

    use super::{Pid, ProcessEntry};

    const LIST_SCRIPT: &str = "Get-CimInstance Win32_Process | \
        ForEach-Object { \"$($_.ProcessId)|$($_.ExecutablePath)\" }";

    pub fn processes() -> Result<Vec<ProcessEntry>> {
        let output = Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-Command", LIST_SCRIPT])
            .output()
            .context("running powershell to list processes")?;
        if !output.status.success() {
            bail!("process listing exited with {}", output.status);
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .filter_map(|line| {
                let (pid, path) = line.trim().split_once('|')?;
                let pid = pid.parse::<Pid>().ok()?;
                let executable = if path.is_empty() {
                    Err("executable path not accessible".to_string())
                } else {
                    Ok(PathBuf::from(path))
                };
                Some(ProcessEntry { pid, executable })
            })
            .collect())
    }

    pub fn terminate(pid: Pid) -> Result<()> {
        let status = Command::new("taskkill")
            .args(["/F", "/PID", &pid.to_string()])
            .status()
            .context("running taskkill")?;
        if !status.success() {
            bail!("taskkill /F /PID {pid} exited with {status}");
        }
        Ok(())
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_listed_with_its_executable() {
        let me = std::process::id();
        let entries = OsProcessTable.processes().unwrap();
        let own = entries.iter().find(|e| e.pid == me).expect("own pid listed");
        let exe = own.executable.as_ref().unwrap();
        assert_eq!(exe, &std::env::current_exe().unwrap());
    }

    #[test]
    fn unreadable_proc_entry_does_not_hide_the_rest() {
        let me = std::process::id();
        let listing: Vec<std::io::Result<(std::ffi::OsString, std::path::PathBuf)>> = vec![
            Err(std::io::Error::other("readdir hiccup")),
            Ok(("self-ish".into(), std::path::PathBuf::from("/proc/self"))),
            Ok((me.to_string().into(), std::path::PathBuf::from(format!("/proc/{me}")))),
        ];

        let entries = imp::collect_entries(listing);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, me);
        assert!(entries[0].executable.is_ok());
    }
}
