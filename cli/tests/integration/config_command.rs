//! Integration tests for `caas-deploy config` command.
//!
//! All filesystem-touching tests set `CAAS_CONFIG` to a temp path so they
//! never read or write `~/.caas/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn caas() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("caas-deploy"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// Subcommand registration
// ---------------------------------------------------------------------------

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    caas()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// `caas-deploy config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    caas()
        .args(["config", "show"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("deployment.name: CaasBase"))
        .stdout(predicate::str::contains("registry.sku: Basic"))
        .stdout(predicate::str::contains("azure.subscription: (not set)"));
}

#[test]
fn test_config_show_json_is_valid() {
    let (_dir, path) = temp_config_path();
    let out = caas()
        .args(["config", "show", "--json"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .success();
    let v: serde_json::Value =
        serde_json::from_slice(&out.get_output().stdout).expect("valid json");
    assert_eq!(v["config"]["deployment"]["vm_instance_count"], 3);
    assert_eq!(v["path"], path.as_str());
}

// ---------------------------------------------------------------------------
// `caas-deploy config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_then_show_round_trips() {
    let (_dir, path) = temp_config_path();
    caas()
        .args(["config", "set", "azure.location", "westeurope"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set azure.location = westeurope"));

    caas()
        .args(["config", "show"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("azure.location: westeurope"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    caas()
        .args(["config", "set", "azure.tenant", "x"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown setting: azure.tenant"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_zero_instance_count_fails() {
    let (_dir, path) = temp_config_path();
    caas()
        .args(["config", "set", "deployment.vm_instance_count", "0"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn test_config_subscription_feeds_provision() {
    let (dir, path) = temp_config_path();
    caas()
        .args(["config", "set", "azure.subscription", "sub-from-config"])
        .env("CAAS_CONFIG", &path)
        .assert()
        .success();

    // subscription now resolves from config; the run stops at the missing template
    let missing = dir.path().join("nope.json");
    caas()
        .args([
            "provision",
            "--resource-group",
            "caas-rg",
            "--cluster-name",
            "prod",
            "--vault-name",
            "prodkv",
            "--registry-name",
            "prodacr",
            "--template-file",
        ])
        .arg(&missing)
        .env("CAAS_CONFIG", &path)
        .env_remove("AZURE_SUBSCRIPTION_ID")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Template file not found"));
}
