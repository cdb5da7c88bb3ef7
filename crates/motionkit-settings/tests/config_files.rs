//! Configuration file round trips

use motionkit_settings::{Config, DeviceKind};
use tempfile::tempdir;

fn sutter_config() -> Config {
    let mut config = Config::new();
    config.connection.port = "/dev/ttyUSB0".to_string();
    config.connection.timeout_ms = 1500;
    config.device.kind = DeviceKind::Sutter;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let config = sutter_config();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = sutter_config();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("motionkit").join("config.toml");

    Config::new().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    assert!(Config::new().save_to_file(&path).is_err());
    std::fs::write(&path, "device: {}").unwrap();
    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_invalid_file_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "[connection]\ntimeout_ms = 0\n").unwrap();
    assert!(Config::load_from_file(&path).is_err());

    std::fs::write(&path, "not = [valid").unwrap();
    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::new();
    config.device.steps_per_micron = -16.0;
    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}
