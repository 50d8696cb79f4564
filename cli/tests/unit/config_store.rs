//! Unit tests for `YamlConfigStore` and the config service.
//!
//! These tests mutate `CAAS_CONFIG` and are serialized with `serial_test`.

#![allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]

use caas_deploy::application::ports::ConfigStore;
use caas_deploy::application::services::config_service;
use caas_deploy::domain::error::ConfigError;
use caas_deploy::infra::config::{CONFIG_ENV, YamlConfigStore};
use serial_test::serial;
use tempfile::TempDir;

fn temp_store() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.yaml");
    // SAFETY: every test touching CAAS_CONFIG is #[serial].
    unsafe { std::env::set_var(CONFIG_ENV, &path) };
    (dir, path)
}

#[test]
#[serial]
fn test_load_missing_file_returns_defaults() {
    let (_dir, _path) = temp_store();
    let config = YamlConfigStore.load().expect("load");
    assert_eq!(config.deployment.name, "CaasBase");
    assert_eq!(config.timeouts.deployment_secs, 7200);
}

#[test]
#[serial]
fn test_path_honours_env_override() {
    let (_dir, path) = temp_store();
    assert_eq!(YamlConfigStore.path().expect("path"), path);
}

#[test]
#[serial]
fn test_set_value_persists_and_reloads() {
    let (_dir, path) = temp_store();

    config_service::set_value(&YamlConfigStore, "azure.location", "westeurope").expect("set");
    config_service::set_value(&YamlConfigStore, "deployment.vm_instance_count", "5")
        .expect("set");

    assert!(path.exists(), "parent directory should be created");
    let reloaded = YamlConfigStore.load().expect("reload");
    assert_eq!(reloaded.azure.location.as_deref(), Some("westeurope"));
    assert_eq!(reloaded.deployment.vm_instance_count, 5);
}

#[test]
#[serial]
fn test_set_value_rejects_unknown_key_without_writing() {
    let (_dir, path) = temp_store();

    let err = config_service::set_value(&YamlConfigStore, "azure.tenant", "x")
        .expect_err("unknown key");

    assert!(err.downcast_ref::<ConfigError>().is_some());
    assert!(!path.exists());
}

#[test]
#[serial]
fn test_set_value_rejects_bad_sku() {
    let (_dir, _path) = temp_store();
    let err = config_service::set_value(&YamlConfigStore, "registry.sku", "Gold")
        .expect_err("bad sku");
    assert!(err.to_string().contains("Basic, Standard, Premium"));
}

#[test]
#[serial]
fn test_load_malformed_file_is_error() {
    let (_dir, path) = temp_store();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "deployment: [not, a, map]\n").unwrap();
    let err = YamlConfigStore.load().expect_err("malformed");
    assert!(err.to_string().contains("cannot parse"));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let (_dir, path) = temp_store();
    config_service::set_value(&YamlConfigStore, "registry.sku", "Standard").expect("set");
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}
