//! Integration tests for configuration files and logging setup

use bridge_traits::time::LogLevel;
use core_runtime::config::{RunConfig, ENV_AUTO_ROTATE, ENV_WP_APP_PASSWORD, ENV_WP_URL};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::path::PathBuf;

fn temp_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("jobsync-config-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

const SAMPLE: &str = r#"{
    "remote": {
        "base_url": "https://jobs.example.com",
        "username": "editor",
        "tags": ["jobs"]
    },
    "ledger": {"path": "state/posted_jobs.json", "max_age_days": 60},
    "pacing": {"base_ms": 1500},
    "auto_rotate": false,
    "regions": [
        {
            "id": "north_america",
            "name": "North America",
            "pause_ms": 3000,
            "countries": [
                {"code": "us", "name": "United States",
                 "locales": [{"query": "software engineer", "city": "Austin"},
                             {"query": "data engineer"}]}
            ]
        }
    ],
    "sources": [
        {"type": "remotive"},
        {"type": "remoteok", "limit": 40},
        {"type": "jsearch"}
    ]
}"#;

#[test]
fn test_file_plus_environment_validates() {
    let path = temp_file(SAMPLE);

    let mut config = RunConfig::from_file(&path).unwrap();
    // The file carries no password; the environment supplies it.
    assert!(config.validate().is_err());

    config.apply_env_overrides(|name| match name {
        ENV_WP_APP_PASSWORD => Some("abcd efgh ijkl".to_string()),
        ENV_AUTO_ROTATE => Some("true".to_string()),
        _ => None,
    });
    config.validate().unwrap();

    assert!(config.auto_rotate);
    assert_eq!(config.remote.tags, vec!["jobs".to_string()]);
    assert_eq!(config.pacing.base_ms, 1500);
    assert_eq!(config.regions[0].pause_ms, Some(3000));
    assert_eq!(config.regions[0].locale_count(), 2);
    assert_eq!(config.sources.len(), 3);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_environment_url_without_scheme_is_fatal() {
    let path = temp_file(SAMPLE);

    let mut config = RunConfig::from_file(&path).unwrap();
    config.apply_env_overrides(|name| match name {
        ENV_WP_URL => Some("jobs.example.com".to_string()),
        ENV_WP_APP_PASSWORD => Some("pw".to_string()),
        _ => None,
    });

    assert!(matches!(config.validate(), Err(Error::Config(_))));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_shipped_example_config_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../jobsync.example.json");

    let config = RunConfig::from_file(&path).unwrap();
    assert_eq!(config.regions.len(), 2);
    assert_eq!(config.sources.len(), 6);
    assert_eq!(config.ledger.max_age_days, 90);
    config.validate().unwrap();
}

#[test]
fn test_missing_file_is_read_error() {
    let path = std::env::temp_dir().join(format!("jobsync-missing-{}.json", uuid::Uuid::new_v4()));
    assert!(matches!(
        RunConfig::from_file(&path),
        Err(Error::ConfigRead { .. })
    ));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let path = temp_file("{ \"regions\": [ ");
    assert!(matches!(
        RunConfig::from_file(&path),
        Err(Error::ConfigParse { .. })
    ));
    std::fs::remove_file(path).ok();
}

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).unwrap();
    assert!(init_logging(config).is_err());
}
