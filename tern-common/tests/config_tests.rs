//! Configuration resolution tests
//!
//! Env-var tests are serialized because they mutate process environment.

use serial_test::serial;
use std::io::Write;
use tern_common::config::{PlayerConfig, DEFAULT_PORT, DEFAULT_RECENT_LIMIT};

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("player.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
#[serial]
fn test_resolve_without_file_uses_defaults() {
    std::env::remove_var("TERN_MP_PORT");
    let config = PlayerConfig::resolve(None, None).unwrap();
    assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
}

#[test]
#[serial]
fn test_file_settings_applied() {
    std::env::remove_var("TERN_MP_PORT");
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
host = "127.0.0.1"
port = 7100
recent_limit = 10
"#,
    );

    let config = PlayerConfig::resolve(Some(&path), None).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 7100);
    assert_eq!(config.recent_limit, 10);
}

#[test]
#[serial]
fn test_env_overrides_file_port() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "port = 7100\n");

    std::env::set_var("TERN_MP_PORT", "7200");
    let config = PlayerConfig::resolve(Some(&path), None).unwrap();
    std::env::remove_var("TERN_MP_PORT");

    assert_eq!(config.port, 7200);
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "port = 7100\n");

    std::env::set_var("TERN_MP_PORT", "7200");
    let config = PlayerConfig::resolve(Some(&path), Some(7300)).unwrap();
    std::env::remove_var("TERN_MP_PORT");

    assert_eq!(config.port, 7300);
}

#[test]
#[serial]
fn test_invalid_env_port_rejected() {
    std::env::set_var("TERN_MP_PORT", "not-a-port");
    let result = PlayerConfig::resolve(None, None);
    std::env::remove_var("TERN_MP_PORT");

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_file_rejected() {
    std::env::remove_var("TERN_MP_PORT");
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "port = \"seven\"\n");

    assert!(PlayerConfig::resolve(Some(&path), None).is_err());
    assert_eq!(PlayerConfig::default().port, DEFAULT_PORT);
}
