use super::validation::{MAX_LINE_BYTES_HARD_LIMIT, MIN_LINE_BYTES};
use super::AppConfig;
use clap::Parser;

#[test]
fn defaults_pass_validation() {
    let mut config = AppConfig::parse_from(["telbridge"]);
    assert!(config.validate().is_ok());
    assert!(config.session_id.is_none());
    assert!(!config.logs);
    assert!(!config.no_logs);
    assert!(!config.log_content);
}

#[test]
fn max_line_bytes_bounds_are_enforced() {
    let mut config = AppConfig::parse_from(["telbridge", "--max-line-bytes", "16"]);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--max-line-bytes"));

    let too_big = (MAX_LINE_BYTES_HARD_LIMIT + 1).to_string();
    let mut config = AppConfig::parse_from(["telbridge", "--max-line-bytes", &too_big]);
    assert!(config.validate().is_err());

    let min = MIN_LINE_BYTES.to_string();
    let mut config = AppConfig::parse_from(["telbridge", "--max-line-bytes", &min]);
    assert!(config.validate().is_ok());
}

#[test]
fn session_id_accepts_safe_characters() {
    let mut config = AppConfig::parse_from(["telbridge", "--session-id", "line-42_a"]);
    assert!(config.validate().is_ok());
}

#[test]
fn session_id_rejects_unsafe_characters() {
    let mut config = AppConfig::parse_from(["telbridge", "--session-id", "bad id!"]);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--session-id"));
}

#[test]
fn session_id_rejects_overlong_values() {
    let long = "x".repeat(65);
    let mut config = AppConfig::parse_from(["telbridge", "--session-id", &long]);
    assert!(config.validate().is_err());
}
