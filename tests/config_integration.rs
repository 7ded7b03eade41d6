//! Integration tests for configuration loading and logging setup
//!
//! These tests check the layering order (defaults, file, environment) and
//! that logging can be initialised more than once.

use std::env;
use std::io::Write;
use std::sync::Mutex;

use authentik_forward_e2e::config::{LoggingSettings, ProbeKind};
use authentik_forward_e2e::{init_logging, AppConfig, Result};

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authentik-e2e.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[test]
fn test_environment_wins_over_file() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let (_dir, path) = write_config(
        r#"
[sandbox]
routing_address = "127.0.0.1:8000"

[bootstrap]
probe = "http"
"#,
    );

    env::set_var("AUTHENTIK_E2E__SANDBOX__ROUTING_ADDRESS", "127.0.0.1:9080");
    env::set_var("AUTHENTIK_E2E__TIMEOUTS__LOGIN_SECONDS", "120");
    let config = AppConfig::load_from(&path);
    env::remove_var("AUTHENTIK_E2E__SANDBOX__ROUTING_ADDRESS");
    env::remove_var("AUTHENTIK_E2E__TIMEOUTS__LOGIN_SECONDS");

    let config = config?;
    assert_eq!(config.sandbox.routing_address, "127.0.0.1:9080".parse().unwrap());
    assert_eq!(config.timeouts.login_seconds, 120);
    assert_eq!(config.bootstrap.probe, ProbeKind::Http);

    Ok(())
}

#[test]
fn test_invalid_environment_value_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();

    env::set_var("AUTHENTIK_E2E__TIMEOUTS__READINESS_SECONDS", "0");
    let result = AppConfig::load_from(std::path::Path::new("does-not-exist.toml"));
    env::remove_var("AUTHENTIK_E2E__TIMEOUTS__READINESS_SECONDS");

    assert!(result.is_err());
}

#[test]
fn test_custom_health_endpoints_from_file() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();

    let (_dir, path) = write_config(
        r#"
[[bootstrap.health_endpoints]]
name = "Traefik"
url = "http://traefik.localhost:8081/ping/"
"#,
    );

    let config = AppConfig::load_from(&path)?;
    let first = &config.bootstrap.health_endpoints[0];
    assert_eq!(first.name, "Traefik");
    assert_eq!(first.url.port(), Some(8081));

    Ok(())
}

#[test]
fn test_init_logging_is_idempotent() {
    let settings = LoggingSettings::default();
    assert!(init_logging(&settings).is_ok());
    assert!(init_logging(&settings).is_ok());
}

#[test]
fn test_invalid_log_level_is_a_config_error() {
    if env::var("RUST_LOG").is_ok() {
        // RUST_LOG takes precedence over the configured level
        return;
    }
    let settings = LoggingSettings { level: "whoami=loud".to_string(), json: false };
    assert!(init_logging(&settings).is_err());
}
