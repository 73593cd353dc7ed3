//! Configuration file loading tests

use std::path::PathBuf;

use simpl_filters::{ConfigError, FilterPipeline, RuntimeConfig};
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "simpl.toml",
        "[parallel]\nenabled = false\nmin_tuples = 64\n\n[logging]\nlevel = \"debug\"\nwith_target = true\n",
    );

    let config = RuntimeConfig::load(&path).unwrap();
    assert!(!config.parallel.enabled);
    assert_eq!(config.parallel.min_tuples, 64);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.with_target);
}

#[test]
fn test_load_json_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "simpl.json", r#"{"parallel": {"min_tuples": 10}}"#);

    let config = RuntimeConfig::load(&path).unwrap();
    assert_eq!(config.parallel.min_tuples, 10);
    assert!(config.parallel.enabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "simpl.toml", "[logging]\nlevel = \"chatty\"\n");

    let err = RuntimeConfig::load(&path).unwrap_err();
    assert_eq!(err, ConfigError::UnknownLevel("chatty".to_string()));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = RuntimeConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_pipeline_takes_parallel_settings() {
    let config = RuntimeConfig::from_toml("[parallel]\nenabled = false").unwrap();
    let pipeline = FilterPipeline::with_config("Configured", &config);
    assert_eq!(pipeline.name(), "Configured");
    assert!(pipeline.is_empty());
}
