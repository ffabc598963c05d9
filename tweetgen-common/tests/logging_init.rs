use tempfile::TempDir;
use tweetgen_common::observability::{init_logging, LogConfig, LogFormat};

#[test]
fn init_logging_creates_dir_and_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("logs");

    let config = LogConfig {
        app_name: "tweetgen-tests",
        log_dir: Some(dir.clone()),
        format: LogFormat::Json,
        default_filter: "debug".to_string(),
        ..LogConfig::default()
    };

    let first = init_logging(config.clone()).expect("first init");
    assert!(dir.is_dir(), "log directory should be created");
    assert!(first.starts_with(&dir));
    assert!(first
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("tweetgen-tests.log.")));
    let utc_today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    assert!(first.to_string_lossy().ends_with(&utc_today));

    tracing::info!(test = "logging_init", "hello from the test");

    let second = init_logging(config).expect("second init is a no-op");
    assert_eq!(first, second);
}
