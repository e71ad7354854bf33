//! Unit tests for configuration parsing and validation.

use std::time::Duration;

use planpatch::config::GlobalConfig;
use planpatch::export::ExportFormat;
use planpatch::service::RetryPolicy;
use planpatch::AppError;

const FULL_TOML: &str = r#"
max_concurrent_steps = 5

[service]
endpoint = "http://127.0.0.1:9000/v1/chat/completions"
model = "local-model"
timeout_seconds = 12
temperature = 0.0

[retry]
max_attempts = 4
initial_delay_ms = 250
max_delay_ms = 2000

[export]
format = "git"
include_metadata = false
"#;

#[test]
fn parses_every_section() {
    let config = GlobalConfig::from_toml_str(FULL_TOML).expect("config parses");

    assert_eq!(config.max_concurrent_steps, 5);
    assert_eq!(config.service.endpoint, "http://127.0.0.1:9000/v1/chat/completions");
    assert_eq!(config.service.model, "local-model");
    assert_eq!(config.service.timeout(), Duration::from_secs(12));
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.export.format, ExportFormat::Git);
    assert!(!config.export.include_metadata);
    assert!(config.service.api_key.is_empty());
}

#[test]
fn empty_document_equals_default() {
    let parsed = GlobalConfig::from_toml_str("").expect("empty config parses");
    assert_eq!(parsed, GlobalConfig::default());
    assert_eq!(parsed.service.timeout_seconds, 30);
    assert_eq!(parsed.retry.max_attempts, 3);
    assert_eq!(parsed.retry.initial_delay_ms, 1000);
    assert_eq!(parsed.retry.max_delay_ms, 30_000);
    assert_eq!(parsed.export.format, ExportFormat::Plain);
    assert!(parsed.export.include_metadata);
    assert_eq!(parsed.max_concurrent_steps, 3);
}

#[test]
fn api_key_in_toml_is_ignored() {
    let config = GlobalConfig::from_toml_str("[service]\napi_key = \"leaked\"\n").expect("parses");
    assert!(config.service.api_key.is_empty());
}

#[test]
fn zero_concurrency_is_rejected() {
    let err = GlobalConfig::from_toml_str("max_concurrent_steps = 0").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn zero_timeout_is_rejected() {
    assert!(GlobalConfig::from_toml_str("[service]\ntimeout_seconds = 0").is_err());
}

#[test]
fn zero_attempts_is_rejected() {
    assert!(GlobalConfig::from_toml_str("[retry]\nmax_attempts = 0").is_err());
}

#[test]
fn max_delay_below_initial_is_rejected() {
    let raw = "[retry]\ninitial_delay_ms = 500\nmax_delay_ms = 100";
    assert!(GlobalConfig::from_toml_str(raw).is_err());
}

#[test]
fn unknown_export_format_is_rejected() {
    let err = GlobalConfig::from_toml_str("[export]\nformat = \"zip\"").unwrap_err();
    assert!(err.to_string().starts_with("config:"));
}

#[test]
fn load_from_path_reads_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("planpatch.toml");
    std::fs::write(&path, FULL_TOML).expect("write config");

    let config = GlobalConfig::load_from_path(&path).expect("loads");
    assert_eq!(config.service.model, "local-model");
}

#[test]
fn load_from_missing_path_is_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = GlobalConfig::load_from_path(temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn retry_policy_follows_config() {
    let config = GlobalConfig::from_toml_str(FULL_TOML).expect("config parses");
    let policy = RetryPolicy::from(&config.retry);
    assert_eq!(policy.max_attempts, 4);
    assert_eq!(policy.initial_delay, Duration::from_millis(250));
    assert_eq!(policy.max_delay, Duration::from_secs(2));
}
