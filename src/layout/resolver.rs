// src/layout/resolver.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{PortableError, Result};
use crate::fs::FileSystem;

use super::InstallationLayout;
use super::matcher::{EntryKind, classify, is_support_dir};

/// Scan `base_dir` and resolve the installation layout.
///
/// Only immediate children are inspected. The base directory is
/// canonicalized first so every path in the returned layout is absolute.
/// A missing `data` directory is created.
pub fn resolve(fs: &dyn FileSystem, base_dir: &Path) -> Result<InstallationLayout> {
    let base = fs.canonicalize(base_dir)?;
    debug!(base = %base.display(), "scanning installation directory");

    let mut runtime: Option<(PathBuf, Option<PathBuf>)> = None;
    let mut broker: Option<PathBuf> = None;
    let mut data: Option<PathBuf> = None;

    for dir in child_dirs(fs, &base)? {
        let Some(name) = file_name(&dir) else {
            continue;
        };

        match classify(&name) {
            Some(EntryKind::Runtime) => {
                if let Some((previous, _)) = &runtime {
                    warn!(
                        previous = %previous.display(),
                        replacement = %dir.display(),
                        "more than one erlang directory found; using the last one"
                    );
                }
                let support = find_support_bin(fs, &dir);
                runtime = Some((dir, support));
            }
            Some(EntryKind::Broker) => {
                if let Some(previous) = &broker {
                    warn!(
                        previous = %previous.display(),
                        replacement = %dir.display(),
                        "more than one rabbitmq directory found; using the last one"
                    );
                }
                broker = Some(dir);
            }
            Some(EntryKind::Data) => data = Some(dir),
            None => debug!(dir = %dir.display(), "ignoring unrelated directory"),
        }
    }

    let (runtime_dir, runtime_bin_dir) = match runtime {
        None => return Err(PortableError::MissingRuntime { base }),
        Some((runtime, None)) => return Err(PortableError::IncompleteRuntime { runtime }),
        Some((runtime, Some(bin))) => (runtime, bin),
    };

    let Some(broker_dir) = broker else {
        return Err(PortableError::MissingBroker { base });
    };

    let data_dir = match data {
        Some(dir) => dir,
        None => create_data_dir(fs, &base)?,
    };

    let layout = InstallationLayout::new(base, runtime_dir, runtime_bin_dir, broker_dir, data_dir);
    info!(
        erlang = %layout.runtime_dir().display(),
        erts = %layout.runtime_bin_dir().display(),
        rabbit = %layout.broker_dir().display(),
        data = %layout.data_dir().display(),
        "installation layout resolved"
    );
    Ok(layout)
}

/// Immediate subdirectories of `dir`, sorted by path so the scan is
/// deterministic regardless of the filesystem's enumeration order.
fn child_dirs(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|p| fs.is_dir(p))
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Find `<runtime>/erts-*/bin`. Directories are compared by name, not by
/// version, and the last match in that order wins (`erts-9.3` sorts after
/// `erts-10.7`).
fn find_support_bin(fs: &dyn FileSystem, runtime_dir: &Path) -> Option<PathBuf> {
    let dirs = match child_dirs(fs, runtime_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            warn!(dir = %runtime_dir.display(), error = %e, "cannot read erlang directory");
            return None;
        }
    };

    dirs.into_iter()
        .rev()
        .filter(|d| file_name(d).is_some_and(|n| is_support_dir(&n)))
        .map(|d| d.join("bin"))
        .find(|bin| fs.is_dir(bin))
}

fn create_data_dir(fs: &dyn FileSystem, base: &Path) -> Result<PathBuf> {
    let path = base.join("data");
    info!(path = %path.display(), "data directory missing; creating it");
    fs.create_dir(&path)
        .map_err(|e| PortableError::DataDirCreateFailed {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;
    Ok(path)
}
