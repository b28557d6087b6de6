/*!
 * Tests for app configuration functionality
 */

use std::time::Duration;

use glossgen::app_config::{BackendConfig, Config, LogLevel, NerMode};

use crate::common::{create_temp_dir, create_test_file};

/// Test default configuration values
#[test]
fn test_default_config_shouldBeValid() {
    let config = Config::default();

    assert_eq!(config.ner_mode, NerMode::Traditional);
    assert_eq!(config.count_threshold, 3);
    assert!(config.translate_surface);
    assert!(config.translate_context_person);
    assert!(config.translate_context_other);
    assert_eq!(config.target_language, "Chinese");
    assert_eq!(config.backend.timeout_secs, 180);
    assert_eq!(config.context_clip_tokens, None);
    assert!(config.validate().is_ok());
}

/// Test that a partial JSON file is completed with defaults
#[test]
fn test_partial_json_shouldFillDefaults() {
    let json = r#"{
        "ner_mode": "external",
        "backend": { "model": "qwen2.5-14b", "concurrent_requests": 8 },
        "translate_context_other": false,
        "blacklist": ["ハハ"],
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.ner_mode, NerMode::External);
    assert_eq!(config.backend.model, "qwen2.5-14b");
    assert_eq!(config.backend.concurrent_requests, 8);
    assert_eq!(config.backend.endpoint, BackendConfig::default().endpoint);
    assert!(!config.translate_context_other);
    assert!(config.translate_context_person);
    assert_eq!(config.blacklist, vec!["ハハ".to_string()]);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.count_threshold, 3);
}

#[test]
fn test_validate_shouldRejectInconsistentSettings() {
    let mut config = Config::default();
    config.backend.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.backend.model = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.backend.api_key = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.backend.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.target_language = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.context_clip_tokens = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.context_clip_tokens = Some(256);
    assert!(config.validate().is_ok());
}

#[test]
fn test_to_worker_config_shouldClampConcurrency() {
    let mut config = Config::default();
    config.backend.concurrent_requests = 0;
    config.backend.timeout_secs = 30;
    config.target_language = "English".to_string();

    let worker = config.to_worker_config();
    assert_eq!(worker.concurrency, 1);
    assert_eq!(worker.timeout, Duration::from_secs(30));
    assert_eq!(worker.target_language, "English");
    assert_eq!(worker.model, config.backend.model);
}

#[test]
fn test_ner_mode_fromStr_shouldIgnoreCase() {
    assert_eq!("External".parse::<NerMode>().unwrap(), NerMode::External);
    assert_eq!("traditional".parse::<NerMode>().unwrap(), NerMode::Traditional);
    assert!("spacy".parse::<NerMode>().is_err());
    assert_eq!(NerMode::External.to_string(), "external");
}

#[test]
fn test_load_or_default_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config, Config::default());
    assert!(path.exists());

    let reloaded = Config::load_or_default(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_load_or_default_withExistingFile_shouldReadIt() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", r#"{"count_threshold": 5, "duplication_min_length": 2}"#).unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.count_threshold, 5);
    assert_eq!(config.duplication_min_length, 2);
}

#[test]
fn test_load_or_default_withBrokenFile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::load_or_default(&path).is_err());
}
