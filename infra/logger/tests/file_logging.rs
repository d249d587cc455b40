use serial_test::serial;
use std::fs;
use std::time::Duration;
use tcard_logger::{LevelFilter, Logger, LoggerError};
use tempfile::tempdir;

// Each integration binary owns one global subscriber, so init happens exactly once here.
#[test]
#[serial]
fn file_logging_creates_log_file_and_rejects_second_init() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("tcard-agent")
        .console(false)
        .directory(&log_dir)
        .json(true)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.has_file_output());

    let err = Logger::builder().name("tcard-agent-second").init().unwrap_err();
    assert!(matches!(err, LoggerError::Subscriber { .. }));

    tracing::info!(enhancement = "weekend-shading", "hello from integration test");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("\"enhancement\":\"weekend-shading\""));
    Ok(())
}
