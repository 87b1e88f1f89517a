// tests/layout_resolution.rs
mod common;
use crate::common::{InstallTreeBuilder, canonical, init_tracing};

use std::error::Error;

use rmq_portable::errors::PortableError;
use rmq_portable::fs::RealFileSystem;
use rmq_portable::layout::resolve;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn resolves_the_four_directories() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let layout = resolve(&RealFileSystem, tree.path())?;
    let base = canonical(tree.path());

    assert_eq!(layout.base_dir(), base);
    assert_eq!(layout.runtime_dir(), base.join("erl23"));
    assert_eq!(layout.runtime_bin_dir(), base.join("erl23/erts-11.0/bin"));
    assert_eq!(layout.broker_dir(), base.join("rabbitmq_server-3.8"));
    assert_eq!(layout.data_dir(), base.join("data"));
    assert!(layout.runtime_dir().is_absolute());

    Ok(())
}

#[test]
fn missing_runtime_directory() {
    init_tracing();

    let tree = InstallTreeBuilder::new().without_runtime().build();

    match resolve(&RealFileSystem, tree.path()) {
        Err(PortableError::MissingRuntime { .. }) => {}
        other => panic!("expected MissingRuntime, got {other:?}"),
    }
}

#[test]
fn runtime_without_erts_is_incomplete() {
    init_tracing();

    let tree = InstallTreeBuilder::new().without_support_dir().build();

    match resolve(&RealFileSystem, tree.path()) {
        Err(PortableError::IncompleteRuntime { runtime }) => {
            assert_eq!(runtime, canonical(tree.path()).join("erl23"));
        }
        other => panic!("expected IncompleteRuntime, got {other:?}"),
    }
}

#[test]
fn missing_broker_directory() {
    init_tracing();

    let tree = InstallTreeBuilder::new().without_broker().build();

    assert!(matches!(
        resolve(&RealFileSystem, tree.path()),
        Err(PortableError::MissingBroker { .. })
    ));
}

#[test]
fn data_directory_is_created_when_absent() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new().without_data().build();
    assert!(!tree.path().join("data").exists());

    let layout = resolve(&RealFileSystem, tree.path())?;

    assert!(tree.path().join("data").is_dir());
    assert_eq!(layout.data_dir(), canonical(tree.path()).join("data"));
    Ok(())
}

#[test]
fn data_file_blocks_directory_creation() {
    init_tracing();

    let tree = InstallTreeBuilder::new().without_data().build();
    std::fs::write(tree.path().join("data"), b"not a directory").unwrap();

    assert!(matches!(
        resolve(&RealFileSystem, tree.path()),
        Err(PortableError::DataDirCreateFailed { .. })
    ));
}

#[test]
fn unrelated_directories_are_ignored() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new()
        .with_dir("docs")
        .with_dir("logs")
        .build();

    let layout = resolve(&RealFileSystem, tree.path())?;
    assert_eq!(layout.runtime_dir(), canonical(tree.path()).join("erl23"));
    Ok(())
}

#[test]
fn missing_base_directory_is_an_error() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let missing = tree.path().join("does-not-exist");

    assert!(resolve(&RealFileSystem, &missing).is_err());
}
