//! Deployment parameter table and assembly.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::{Map, Value, json};

use crate::domain::error::ProvisionError;
use crate::domain::resources::{AdminCredentials, Certificate, ResourceGroup, Vault};

pub const CLUSTER_NAME: &str = "clusterName";
pub const CLUSTER_LOCATION: &str = "clusterLocation";
pub const CERTIFICATE_THUMBPRINT: &str = "certificateThumbprint";
pub const CERTIFICATE_URL: &str = "certificateUrlValue";
pub const SOURCE_VAULT: &str = "sourceVaultValue";
pub const ADMIN_USERNAME: &str = "adminUserName";
pub const ADMIN_PASSWORD: &str = "adminPassword";

/// Every key the cluster template requires, in assembly order.
pub const REQUIRED_KEYS: &[&str] = &[
    CLUSTER_NAME,
    CLUSTER_LOCATION,
    CERTIFICATE_THUMBPRINT,
    CERTIFICATE_URL,
    SOURCE_VAULT,
    ADMIN_USERNAME,
    ADMIN_PASSWORD,
];

/// Keys whose values must never be printed.
pub const SECRET_KEYS: &[&str] = &[ADMIN_PASSWORD];

const PARAMETERS_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#";

/// Flat name → value mapping submitted with the template. Each key is
/// written at most once.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ParameterTable {
    entries: BTreeMap<String, String>,
}

impl std::fmt::Debug for ParameterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.redacted()).finish()
    }
}

impl ParameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is already present.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if self.entries.contains_key(key) {
            return Err(ProvisionError::DuplicateParameter {
                key: key.to_string(),
            }
            .into());
        }
        self.entries.insert(key.to_string(), value.into());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Render as an ARM deployment parameters document.
    #[must_use]
    pub fn to_parameters_document(&self) -> Value {
        let parameters: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), json!({ "value": v })))
            .collect();
        json!({
            "$schema": PARAMETERS_SCHEMA,
            "contentVersion": "1.0.0.0",
            "parameters": parameters,
        })
    }

    /// Copy of the table with secret values masked, for display.
    #[must_use]
    pub fn redacted(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| {
                let shown = if SECRET_KEYS.contains(&k.as_str()) {
                    "********".to_string()
                } else {
                    v.clone()
                };
                (k.clone(), shown)
            })
            .collect()
    }
}

/// Resolved handles the assembler reads from. Any `None` is a missing
/// precondition.
#[derive(Debug, Default)]
pub struct AssemblyInputs<'a> {
    pub cluster_name: Option<&'a str>,
    pub resource_group: Option<&'a ResourceGroup>,
    pub vault: Option<&'a Vault>,
    pub certificate: Option<&'a Certificate>,
    pub credentials: Option<&'a AdminCredentials>,
}

fn require<'v>(key: &'static str, value: Option<&'v str>) -> Result<&'v str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProvisionError::MissingParameter { key }.into()),
    }
}

/// Build the template parameter table from resolved handles.
///
/// # Errors
///
/// Returns `MissingParameter` naming the first absent or empty field.
pub fn assemble_parameters(inputs: &AssemblyInputs<'_>) -> Result<ParameterTable> {
    let mut table = ParameterTable::new();
    table.insert(CLUSTER_NAME, require(CLUSTER_NAME, inputs.cluster_name)?)?;
    table.insert(
        CLUSTER_LOCATION,
        require(
            CLUSTER_LOCATION,
            inputs.resource_group.map(|g| g.location.as_str()),
        )?,
    )?;
    table.insert(
        CERTIFICATE_THUMBPRINT,
        require(
            CERTIFICATE_THUMBPRINT,
            inputs.certificate.map(|c| c.thumbprint.as_str()),
        )?
        .to_ascii_uppercase(),
    )?;
    table.insert(
        CERTIFICATE_URL,
        require(
            CERTIFICATE_URL,
            inputs.certificate.map(|c| c.secret_id.as_str()),
        )?,
    )?;
    table.insert(
        SOURCE_VAULT,
        require(SOURCE_VAULT, inputs.vault.map(|v| v.id.as_str()))?,
    )?;
    table.insert(
        ADMIN_USERNAME,
        require(
            ADMIN_USERNAME,
            inputs.credentials.map(|c| c.username.as_str()),
        )?,
    )?;
    table.insert(
        ADMIN_PASSWORD,
        require(
            ADMIN_PASSWORD,
            inputs.credentials.map(|c| c.password.as_str()),
        )?,
    )?;
    Ok(table)
}
