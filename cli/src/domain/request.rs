//! Provisioning request: raw inputs and their resolved, validated form.
//!
//! Default resolution happens once, here, before any provider call.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::config::CaasConfig;
use crate::domain::error::ProvisionError;
use crate::domain::resources::{
    admin_secret_name, certificate_name, derive_admin_username, normalize_location,
    validate_cluster_name, validate_registry_name, validate_resource_group_name,
    validate_vault_name,
};

/// Inputs as given by the user. `None` means "use the fallback".
#[derive(Debug, Clone, Default)]
pub struct ProvisionInput {
    pub subscription: Option<String>,
    pub resource_group: String,
    pub location: Option<String>,
    pub cluster_name: String,
    pub vault_name: String,
    pub registry_name: String,
    pub vm_instance_count: Option<u32>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub deployment_name: Option<String>,
    pub template_file: Option<PathBuf>,
    pub registry_sku: Option<String>,
}

/// Fully resolved request. Only `location` and `admin_password` stay
/// optional: the former is needed only when the group must be created, the
/// latter is looked up or generated by the credential step.
#[derive(Clone)]
pub struct ProvisionRequest {
    pub subscription: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub cluster_name: String,
    pub vault_name: String,
    pub registry_name: String,
    pub registry_sku: String,
    pub vm_instance_count: u32,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub admin_secret_name: String,
    pub certificate_name: String,
    pub deployment_name: String,
    pub template_file: PathBuf,
}

impl std::fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("subscription", &self.subscription)
            .field("resource_group", &self.resource_group)
            .field("location", &self.location)
            .field("cluster_name", &self.cluster_name)
            .field("vault_name", &self.vault_name)
            .field("registry_name", &self.registry_name)
            .field("vm_instance_count", &self.vm_instance_count)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("deployment_name", &self.deployment_name)
            .field("template_file", &self.template_file)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProvisionInput {
    /// Validate names and fill every default from `config`.
    ///
    /// Fallback order for each optional field is: command line, config file,
    /// built-in default. The admin username falls back to a name derived from
    /// the cluster name.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is invalid, the subscription is missing,
    /// or the VM instance count is zero.
    pub fn resolve(self, config: &CaasConfig) -> Result<ProvisionRequest> {
        let subscription = non_empty(self.subscription)
            .or_else(|| non_empty(config.azure.subscription.clone()))
            .ok_or(ProvisionError::MissingSubscription)?;

        validate_resource_group_name(&self.resource_group)?;
        validate_cluster_name(&self.cluster_name)?;
        validate_vault_name(&self.vault_name)?;
        validate_registry_name(&self.registry_name)?;

        let vm_instance_count = self
            .vm_instance_count
            .unwrap_or(config.deployment.vm_instance_count);
        if vm_instance_count == 0 {
            anyhow::bail!("VM instance count must be at least 1");
        }

        let admin_username = match non_empty(self.admin_username) {
            Some(name) => name,
            None => derive_admin_username(&self.cluster_name)?,
        };

        Ok(ProvisionRequest {
            subscription,
            location: non_empty(self.location)
                .or_else(|| non_empty(config.azure.location.clone()))
                .map(|l| normalize_location(&l)),
            admin_secret_name: admin_secret_name(&self.cluster_name),
            certificate_name: certificate_name(&self.cluster_name),
            registry_sku: non_empty(self.registry_sku)
                .unwrap_or_else(|| config.registry.sku.clone()),
            admin_password: non_empty(self.admin_password),
            deployment_name: non_empty(self.deployment_name)
                .unwrap_or_else(|| config.deployment.name.clone()),
            template_file: self
                .template_file
                .unwrap_or_else(|| PathBuf::from(&config.deployment.template_file)),
            resource_group: self.resource_group,
            cluster_name: self.cluster_name,
            vault_name: self.vault_name,
            registry_name: self.registry_name,
            vm_instance_count,
            admin_username,
        })
    }
}
