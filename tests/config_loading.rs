// tests/config_loading.rs
use std::io::Write;

use rmq_portable::config::{
    CONFIG_FILE_NAME, default_config_path, load_and_validate, load_from_path, load_or_default,
};
use rmq_portable::errors::PortableError;
use tempfile::{NamedTempFile, TempDir};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn full_file_is_loaded() {
    let file = config_file(
        r#"
[supervisor]
autostart = false
exit_on_start_failure = false

[broker]
entrypoint = "rabbitmq-server-debug"
ready_pattern = "Server startup complete"

[console]
enabled = false
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert!(!cfg.supervisor.autostart);
    assert!(!cfg.supervisor.exit_on_start_failure);
    assert!(!cfg.console.enabled);
    assert_eq!(cfg.broker.entrypoint, "rabbitmq-server-debug");

    let options = cfg.supervisor_options();
    assert_eq!(options.entrypoint, "rabbitmq-server-debug");
    assert!(
        options
            .ready_pattern
            .is_some_and(|re| re.is_match("  Server startup complete; 3 plugins started."))
    );
}

#[test]
fn missing_sections_take_defaults() {
    let file = config_file("[console]\nenabled = false\n");

    let cfg = load_and_validate(file.path()).unwrap();
    assert!(cfg.supervisor.autostart);
    assert!(cfg.supervisor.exit_on_start_failure);
    assert_eq!(cfg.broker.entrypoint, "rabbitmq-server");
    assert!(cfg.ready_pattern().is_some());
}

#[test]
fn empty_ready_pattern_disables_detection() {
    let file = config_file("[broker]\nready_pattern = \"\"\n");
    let cfg = load_and_validate(file.path()).unwrap();
    assert!(cfg.ready_pattern().is_none());
    assert!(cfg.supervisor_options().ready_pattern.is_none());
}

#[test]
fn entrypoint_with_a_path_is_rejected() {
    let file = config_file("[broker]\nentrypoint = \"../bin/evil\"\n");
    match load_and_validate(file.path()) {
        Err(PortableError::ConfigError(msg)) => assert!(msg.contains("entrypoint")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_regex_is_rejected() {
    let file = config_file("[broker]\nready_pattern = \"completed (\"\n");
    match load_and_validate(file.path()) {
        Err(PortableError::ConfigError(msg)) => assert!(msg.contains("ready_pattern")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = config_file("[supervisor\nautostart = ");
    assert!(matches!(
        load_from_path(file.path()),
        Err(PortableError::TomlError(_))
    ));
}

#[test]
fn wrong_value_type_is_a_toml_error() {
    let file = config_file("[supervisor]\nautostart = \"yes\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(PortableError::TomlError(_))
    ));
}

#[test]
fn missing_file_yields_defaults_but_explicit_load_fails() {
    let dir = TempDir::new().unwrap();
    let path = default_config_path(dir.path());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(CONFIG_FILE_NAME));

    let cfg = load_or_default(&path).unwrap();
    assert!(cfg.supervisor.autostart);
    assert!(cfg.console.enabled);

    assert!(matches!(
        load_and_validate(&path),
        Err(PortableError::IoError(_))
    ));
}
