#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rmq_portable::fs::RealFileSystem;
use rmq_portable::layout::{InstallationLayout, resolve};

pub use rmq_portable_test_utils::builders::{InstallTree, InstallTreeBuilder};
pub use rmq_portable_test_utils::init_tracing;

/// Resolve a synthetic tree with the real filesystem.
pub fn resolve_tree(tree: &InstallTree) -> Arc<InstallationLayout> {
    Arc::new(resolve(&RealFileSystem, tree.path()).expect("tree should resolve"))
}

pub fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().expect("path exists")
}
