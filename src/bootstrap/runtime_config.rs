// src/bootstrap/runtime_config.rs

//! Erlang's `erl.ini` bootstrap file.
//!
//! A relocated Erlang install only works once `erl.ini` names its real
//! `Bindir` and `Rootdir`, so the file is rewritten on every start.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::{PortableError, Result};
use crate::fs::FileSystem;
use crate::layout::InstallationLayout;

const SECTION: &str = "[erlang]";
const PROGNAME: &str = "erl";

/// Values read back from an `erl.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub bindir: PathBuf,
    pub progname: String,
    pub rootdir: PathBuf,
}

/// Render the file contents for a layout. Backslashes are doubled, as the
/// ini reader in `erl.exe` treats them as escapes.
pub fn render_runtime_config(layout: &InstallationLayout) -> String {
    format!(
        "{SECTION}\nBindir={}\nProgname={PROGNAME}\nRootdir={}\n",
        escape(layout.runtime_bin_dir()),
        escape(layout.runtime_dir()),
    )
}

/// Write `<runtime>/bin/erl.ini`, replacing any existing file.
pub fn write_runtime_config(fs: &dyn FileSystem, layout: &InstallationLayout) -> Result<PathBuf> {
    let path = layout.runtime_config_path();
    fs.write(&path, render_runtime_config(layout).as_bytes())
        .map_err(|e| PortableError::ConfigWriteFailed {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;
    info!(path = %path.display(), "updated erlang bootstrap config");
    Ok(path)
}

/// Parse the format produced by [`render_runtime_config`].
pub fn parse_runtime_config(text: &str) -> Result<RuntimeConfig> {
    let mut bindir = None;
    let mut progname = None;
    let mut rootdir = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('[') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(PortableError::ConfigError(format!(
                "malformed erl.ini line: {line:?}"
            )));
        };
        match key.trim() {
            "Bindir" => bindir = Some(PathBuf::from(unescape(value.trim()))),
            "Progname" => progname = Some(value.trim().to_string()),
            "Rootdir" => rootdir = Some(PathBuf::from(unescape(value.trim()))),
            _ => {}
        }
    }

    let missing = |key: &str| PortableError::ConfigError(format!("erl.ini is missing {key}"));
    Ok(RuntimeConfig {
        bindir: bindir.ok_or_else(|| missing("Bindir"))?,
        progname: progname.ok_or_else(|| missing("Progname"))?,
        rootdir: rootdir.ok_or_else(|| missing("Rootdir"))?,
    })
}

fn escape(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

fn unescape(value: &str) -> String {
    value.replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn windows_layout() -> InstallationLayout {
        InstallationLayout::new(
            r"C:\portable",
            r"C:\portable\erl23",
            r"C:\portable\erl23\erts-11.0\bin",
            r"C:\portable\rabbitmq",
            r"C:\portable\data",
        )
    }

    #[test]
    fn backslashes_are_doubled() {
        let text = render_runtime_config(&windows_layout());
        assert_eq!(
            text,
            "[erlang]\n\
             Bindir=C:\\\\portable\\\\erl23\\\\erts-11.0\\\\bin\n\
             Progname=erl\n\
             Rootdir=C:\\\\portable\\\\erl23\n"
        );
    }

    #[test]
    fn parse_reverses_escaping() {
        let parsed = parse_runtime_config(&render_runtime_config(&windows_layout())).unwrap();
        assert_eq!(parsed.bindir, PathBuf::from(r"C:\portable\erl23\erts-11.0\bin"));
        assert_eq!(parsed.rootdir, PathBuf::from(r"C:\portable\erl23"));
        assert_eq!(parsed.progname, "erl");
    }

    #[test]
    fn parse_rejects_incomplete_files() {
        let err = parse_runtime_config("[erlang]\nBindir=/x\n").unwrap_err();
        assert!(err.to_string().contains("Progname"));
    }

    #[test]
    fn write_overwrites_existing_file() {
        let fs = MockFileSystem::new();
        let layout = InstallationLayout::new(
            "/p",
            "/p/erl23",
            "/p/erl23/erts-11.0/bin",
            "/p/rabbitmq",
            "/p/data",
        );
        fs.add_file("/p/erl23/bin/erl.ini", b"stale");

        let path = write_runtime_config(&fs, &layout).unwrap();
        assert_eq!(path, PathBuf::from("/p/erl23/bin/erl.ini"));

        let parsed = parse_runtime_config(&fs.read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.bindir, layout.runtime_bin_dir());
        assert_eq!(parsed.rootdir, layout.runtime_dir());
    }

    #[test]
    fn write_failure_is_fatal() {
        let fs = MockFileSystem::new();
        fs.add_dir("/p/erl23/bin");
        fs.set_read_only("/p/erl23/bin");
        let layout = InstallationLayout::new(
            "/p",
            "/p/erl23",
            "/p/erl23/erts-11.0/bin",
            "/p/rabbitmq",
            "/p/data",
        );

        match write_runtime_config(&fs, &layout) {
            Err(err @ PortableError::ConfigWriteFailed { .. }) => assert!(err.is_fatal()),
            other => panic!("expected ConfigWriteFailed, got {other:?}"),
        }
    }
}
