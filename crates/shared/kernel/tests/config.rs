use serial_test::serial;
use std::io::Write;
use tcard_kernel::KernelError;
use tcard_kernel::config::load_config;
use tcard_kernel::domain::config::AgentConfig;

#[test]
#[serial]
fn defaults_apply_without_a_file() {
    let cfg: AgentConfig = load_config(None::<&str>).unwrap();
    assert_eq!(cfg.timing.quiet_window_ms, 250);
    assert_eq!(cfg.timing.load_delay_ms, 500);
    assert_eq!(cfg.timing.settle_delay_ms, 150);
    assert_eq!(cfg.logging.level, "info");
    assert!(cfg.store.path.is_none());
}

#[test]
#[serial]
fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[timing]\nquiet_window_ms = 40\n\n[store]\npath = \"prefs.json\"").unwrap();

    let cfg: AgentConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.timing.quiet_window_ms, 40);
    assert_eq!(cfg.timing.settle_delay_ms, 150);
    assert_eq!(cfg.store.path.as_deref(), Some(std::path::Path::new("prefs.json")));
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let err = load_config::<AgentConfig>(Some("definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, KernelError::Config { .. }));
}
