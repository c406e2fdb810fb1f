// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use photostudio::Config;
use photostudio::config::PhotoOutputFormat;
use photostudio::constants::{DEFAULT_DETECTION_WORKERS, DEFAULT_MAX_CONCURRENT_CAPTURES};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        config.object_detection_enabled,
        "Object detection should be enabled by default"
    );
    assert_eq!(config.detection_workers, DEFAULT_DETECTION_WORKERS);
    assert_eq!(config.max_concurrent_captures, DEFAULT_MAX_CONCURRENT_CAPTURES);
    assert_eq!(config.photo_output_format, PhotoOutputFormat::Jpeg);
}

#[test]
fn test_config_overrides_take_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: Some(dir.path().join("x.db")),
        photos_dir: Some(dir.path().join("pics")),
        ..Config::default()
    };
    assert_eq!(config.database_path().unwrap(), dir.path().join("x.db"));
    assert_eq!(config.photos_dir().unwrap(), dir.path().join("pics"));
}

#[test]
fn test_config_json_field_names_are_stable() {
    let json = serde_json::to_value(Config::default()).unwrap();
    for key in [
        "object_detection_enabled",
        "detection_workers",
        "max_concurrent_captures",
        "photo_output_format",
        "jpeg_quality",
        "photos_dir",
        "database_path",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}
