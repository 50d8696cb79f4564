//! Domain types and validators for caas-deploy configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "azure.subscription",
    "azure.location",
    "deployment.name",
    "deployment.template_file",
    "deployment.vm_instance_count",
    "registry.sku",
    "timeouts.command_secs",
    "timeouts.deployment_secs",
];
pub const VALID_REGISTRY_SKUS: &[&str] = &["Basic", "Standard", "Premium"];

pub const DEFAULT_DEPLOYMENT_NAME: &str = "CaasBase";
pub const DEFAULT_TEMPLATE_FILE: &str = "SFDeployTemplate.json";
pub const DEFAULT_VM_INSTANCE_COUNT: u32 = 3;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.caas/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CaasConfig {
    pub azure: AzureConfig,
    pub deployment: DeploymentConfig,
    pub registry: RegistryConfig,
    pub timeouts: TimeoutConfig,
}

/// Fallbacks for arguments not given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AzureConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub name: String,
    pub template_file: String,
    pub vm_instance_count: u32,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEPLOYMENT_NAME.to_string(),
            template_file: DEFAULT_TEMPLATE_FILE.to_string(),
            vm_instance_count: DEFAULT_VM_INSTANCE_COUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry SKU used on the create path: `Basic`, `Standard` or `Premium`.
    pub sku: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sku: "Basic".to_string(),
        }
    }
}

/// Per-call timeouts for the `az` CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub command_secs: u64,
    pub deployment_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_secs: 120,
            deployment_secs: 7200,
        }
    }
}

impl CaasConfig {
    /// Apply a validated `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "azure.subscription" => self.azure.subscription = Some(value.to_string()),
            "azure.location" => self.azure.location = Some(value.to_string()),
            "deployment.name" => self.deployment.name = value.to_string(),
            "deployment.template_file" => self.deployment.template_file = value.to_string(),
            "deployment.vm_instance_count" => {
                self.deployment.vm_instance_count = parse_positive(key, value)?;
            }
            "registry.sku" => self.registry.sku = value.to_string(),
            "timeouts.command_secs" => self.timeouts.command_secs = parse_positive(key, value)?,
            "timeouts.deployment_secs" => {
                self.timeouts.deployment_secs = parse_positive(key, value)?;
            }
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }

    /// Every settable key with its current value, in `VALID_CONFIG_KEYS` order.
    /// Unset optional values show as `(not set)`.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let unset = || "(not set)".to_string();
        vec![
            (
                "azure.subscription",
                self.azure.subscription.clone().unwrap_or_else(unset),
            ),
            (
                "azure.location",
                self.azure.location.clone().unwrap_or_else(unset),
            ),
            ("deployment.name", self.deployment.name.clone()),
            (
                "deployment.template_file",
                self.deployment.template_file.clone(),
            ),
            (
                "deployment.vm_instance_count",
                self.deployment.vm_instance_count.to_string(),
            ),
            ("registry.sku", self.registry.sku.clone()),
            (
                "timeouts.command_secs",
                self.timeouts.command_secs.to_string(),
            ),
            (
                "timeouts.deployment_secs",
                self.timeouts.deployment_secs.to_string(),
            ),
        ]
    }
}

fn parse_positive<T: std::str::FromStr + PartialOrd + Default>(key: &str, value: &str) -> Result<T> {
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: "a positive integer".to_string(),
        }
        .into()),
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.to_string(),
        }
        .into()
    };
    match key {
        "registry.sku" if !VALID_REGISTRY_SKUS.contains(&value) => {
            Err(invalid(&VALID_REGISTRY_SKUS.join(", ")))
        }
        "deployment.vm_instance_count" | "timeouts.command_secs" | "timeouts.deployment_secs" => {
            parse_positive::<u64>(key, value).map(|_| ())
        }
        _ if value.trim().is_empty() => Err(invalid("a non-empty string")),
        _ => Ok(()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
