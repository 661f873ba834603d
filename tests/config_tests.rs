// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use cvfx::backends::camera::{CameraBackendType, RenderTarget};
use cvfx::config::Config;
use cvfx::errors::ConfigError;
use std::time::Duration;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("cvfx-config-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.camera_id, 0);
    assert_eq!(config.tick_interval(), Duration::from_millis(33));
    assert!(config.logging_active);
    assert!(config.render_default(RenderTarget::Main));
    assert!(!config.render_default(RenderTarget::Alpha));
    assert!(!config.render_default(RenderTarget::Beta));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = scratch_dir("missing");
    let config = Config::load_from(&dir.join("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load() {
    let dir = scratch_dir("save");
    let path = dir.join("nested").join("config.json");

    let config = Config {
        camera_id: 2,
        backend: CameraBackendType::Synthetic,
        render_beta: true,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = scratch_dir("partial");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, r#"{ "camera_id": 1, "backend": "Synthetic" }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.camera_id, 1);
    assert_eq!(config.backend, CameraBackendType::Synthetic);
    assert_eq!(config.tick_interval_ms, 33);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = scratch_dir("malformed");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_zero_interval_is_clamped() {
    let config = Config {
        tick_interval_ms: 0,
        ..Config::default()
    };
    assert_eq!(config.tick_interval(), Duration::from_millis(1));
}
