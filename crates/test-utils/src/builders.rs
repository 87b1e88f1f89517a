#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const RUNTIME_DIR: &str = "erl23";
pub const SUPPORT_DIR: &str = "erts-11.0";
pub const BROKER_DIR: &str = "rabbitmq_server-3.8";

/// A synthetic portable installation on disk, removed on drop.
#[derive(Debug)]
pub struct InstallTree {
    dir: TempDir,
}

impl InstallTree {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.path().join(RUNTIME_DIR)
    }

    pub fn runtime_bin_dir(&self) -> PathBuf {
        self.runtime_dir().join(SUPPORT_DIR).join("bin")
    }

    pub fn broker_dir(&self) -> PathBuf {
        self.path().join(BROKER_DIR)
    }

    pub fn sbin_dir(&self) -> PathBuf {
        self.broker_dir().join("sbin")
    }

    /// Replace the console script with a non-interactive `sh` stand-in.
    pub fn write_console_stand_in(&self, body: &str) -> PathBuf {
        let path = self.sbin_dir().join("startShell.sh");
        write_executable(&path, &format!("#!/bin/sh\n{body}\n"));
        path
    }

    /// Write `sbin/rabbitmq-server` as an executable `sh` script.
    pub fn write_entrypoint(&self, body: &str) -> PathBuf {
        let path = self.sbin_dir().join("rabbitmq-server");
        write_executable(&path, &format!("#!/bin/sh\n{body}\n"));
        path
    }
}

/// Builder for [`InstallTree`].
///
/// By default creates exactly `erl23/erts-11.0/bin`,
/// `rabbitmq_server-3.8/sbin` and `data`. `erl23/bin`, where `erl.ini`
/// lives, only exists when asked for.
pub struct InstallTreeBuilder {
    runtime: bool,
    support: bool,
    runtime_bin: bool,
    broker: bool,
    data: bool,
    extra_dirs: Vec<String>,
}

impl InstallTreeBuilder {
    pub fn new() -> Self {
        Self {
            runtime: true,
            support: true,
            runtime_bin: false,
            broker: true,
            data: true,
            extra_dirs: Vec::new(),
        }
    }

    pub fn without_runtime(mut self) -> Self {
        self.runtime = false;
        self
    }

    pub fn without_support_dir(mut self) -> Self {
        self.support = false;
        self
    }

    /// Also create `erl23/bin`, as shipped Erlang distributions do.
    pub fn with_runtime_bin_dir(mut self) -> Self {
        self.runtime_bin = true;
        self
    }

    pub fn without_broker(mut self) -> Self {
        self.broker = false;
        self
    }

    pub fn without_data(mut self) -> Self {
        self.data = false;
        self
    }

    pub fn with_dir(mut self, relative: &str) -> Self {
        self.extra_dirs.push(relative.to_string());
        self
    }

    pub fn build(self) -> InstallTree {
        let dir = tempfile::tempdir().expect("create temp install dir");
        let root = dir.path();

        if self.runtime {
            fs::create_dir_all(root.join(RUNTIME_DIR)).unwrap();
            if self.runtime_bin {
                fs::create_dir_all(root.join(RUNTIME_DIR).join("bin")).unwrap();
            }
            if self.support {
                fs::create_dir_all(root.join(RUNTIME_DIR).join(SUPPORT_DIR).join("bin")).unwrap();
            }
        }
        if self.broker {
            fs::create_dir_all(root.join(BROKER_DIR).join("sbin")).unwrap();
        }
        if self.data {
            fs::create_dir_all(root.join("data")).unwrap();
        }
        for extra in &self.extra_dirs {
            fs::create_dir_all(root.join(extra)).unwrap();
        }

        InstallTree { dir }
    }
}

impl Default for InstallTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
