// tests/bootstrap_files.rs
mod common;
use crate::common::{InstallTreeBuilder, init_tracing, resolve_tree};

use std::error::Error;
use std::fs;

use rmq_portable::bootstrap::{
    BrokerEnvironment, parse_runtime_config, write_console_script, write_runtime_config,
};
use rmq_portable::errors::PortableError;
use rmq_portable::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn runtime_config_round_trips_through_disk() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let layout = resolve_tree(&tree);

    let path = write_runtime_config(&RealFileSystem, &layout)?;
    assert_eq!(path, layout.runtime_dir().join("bin").join("erl.ini"));

    let parsed = parse_runtime_config(&fs::read_to_string(&path)?)?;
    assert_eq!(parsed.bindir, layout.runtime_bin_dir());
    assert_eq!(parsed.rootdir, layout.runtime_dir());
    assert_eq!(parsed.progname, "erl");
    Ok(())
}

#[test]
fn runtime_config_creates_the_runtime_bin_dir() -> TestResult {
    init_tracing();

    // Only erl23/erts-11.0/bin, rabbitmq_server-3.8/sbin and data exist.
    let tree = InstallTreeBuilder::new().build();
    assert!(!tree.runtime_dir().join("bin").exists());
    let layout = resolve_tree(&tree);

    let path = write_runtime_config(&RealFileSystem, &layout)?;

    assert!(path.is_file());
    let parsed = parse_runtime_config(&fs::read_to_string(&path)?)?;
    assert_eq!(parsed.bindir, layout.runtime_bin_dir());
    assert_eq!(parsed.rootdir, layout.runtime_dir());
    Ok(())
}

#[test]
fn runtime_config_replaces_stale_file() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new().with_runtime_bin_dir().build();
    let layout = resolve_tree(&tree);
    let ini = layout.runtime_config_path();
    fs::write(&ini, "[erlang]\nBindir=C:\\\\old\nProgname=erl\nRootdir=C:\\\\old\n")?;

    write_runtime_config(&RealFileSystem, &layout)?;

    let parsed = parse_runtime_config(&fs::read_to_string(&ini)?)?;
    assert_eq!(parsed.rootdir, layout.runtime_dir());
    Ok(())
}

#[test]
fn runtime_config_write_failure_is_reported() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let layout = resolve_tree(&tree);
    // A directory in place of the file makes the write fail even as root.
    fs::create_dir_all(layout.runtime_config_path()).unwrap();

    assert!(matches!(
        write_runtime_config(&RealFileSystem, &layout),
        Err(PortableError::ConfigWriteFailed { .. })
    ));
}

#[test]
fn console_script_exports_the_broker_environment() -> TestResult {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let layout = resolve_tree(&tree);

    let path = write_console_script(&RealFileSystem, &layout)?;
    assert_eq!(path.parent(), Some(layout.sbin_dir().as_path()));

    let script = fs::read_to_string(&path)?;
    let env = BrokerEnvironment::from_layout(&layout);
    for (key, value) in env.vars() {
        assert!(script.contains(key.as_str()), "script lacks {key}");
        assert!(script.contains(value.as_str()), "script lacks value of {key}");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path)?.permissions().mode();
        assert_ne!(mode & 0o111, 0, "console script must be executable");
    }
    Ok(())
}

#[test]
fn console_script_failure_is_not_fatal() {
    init_tracing();

    let tree = InstallTreeBuilder::new().build();
    let layout = resolve_tree(&tree);
    fs::create_dir_all(layout.console_script_path()).unwrap();

    match write_console_script(&RealFileSystem, &layout) {
        Err(err @ PortableError::ConsoleScriptWriteFailed { .. }) => assert!(!err.is_fatal()),
        other => panic!("expected ConsoleScriptWriteFailed, got {other:?}"),
    }
}
