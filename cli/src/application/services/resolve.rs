//! Application service — lookup-or-create for each provider resource.
//!
//! Every resolver performs one non-mutating lookup and at most one create.
//! Errors are surfaced as-is; nothing is retried or rolled back.

use anyhow::{Context, Result};

use crate::application::ports::{
    CertificateApi, CertificateSpec, InputPrompt, ProgressReporter, RegistryApi, RegistrySpec,
    ResourceGroupApi, VaultApi,
};
use crate::domain::error::ProvisionError;
use crate::domain::resources::{
    Certificate, Registry, Resolved, ResourceGroup, Session, Vault, normalize_location,
};

/// Self-signed certificate lifetime.
pub const CERTIFICATE_VALIDITY_MONTHS: u32 = 12;

/// Look up the resource group, creating it when absent.
///
/// `location` is only consulted on the create path. When it is `None` the
/// user is prompted; if prompting is impossible the run fails with
/// `MissingRegion`.
///
/// # Errors
///
/// Returns an error if the lookup or create call fails, or no region is
/// available for a group that must be created.
pub async fn ensure_resource_group(
    api: &impl ResourceGroupApi,
    session: &Session,
    name: &str,
    location: Option<&str>,
    prompt: &impl InputPrompt,
    reporter: &impl ProgressReporter,
) -> Result<Resolved<ResourceGroup>> {
    if let Some(group) = api
        .get_resource_group(session, name)
        .await
        .with_context(|| format!("looking up resource group {name}"))?
    {
        if let Some(requested) = location {
            if normalize_location(requested) != normalize_location(&group.location) {
                reporter.warn(&format!(
                    "resource group {name} already exists in {}; ignoring location {requested}",
                    group.location
                ));
            }
        }
        return Ok(Resolved::Existing(group));
    }

    let location = match location {
        Some(l) => l.to_string(),
        None => prompt
            .ask(&format!("Location for new resource group '{name}'"))?
            .map(|l| normalize_location(&l))
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ProvisionError::MissingRegion {
                resource_group: name.to_string(),
            })?,
    };

    reporter.step(&format!("creating resource group {name} in {location}..."));
    let group = api
        .create_resource_group(session, name, &location)
        .await
        .with_context(|| format!("creating resource group {name}"))?;
    Ok(Resolved::Created(group))
}

/// Look up the registry by exact name within the group, creating it when
/// absent. Registries with other names are never adopted.
///
/// # Errors
///
/// Returns an error if the list or create call fails.
pub async fn ensure_registry(
    api: &impl RegistryApi,
    session: &Session,
    group: &ResourceGroup,
    name: &str,
    sku: &str,
    reporter: &impl ProgressReporter,
) -> Result<Resolved<Registry>> {
    let registries = api
        .list_registries(session, &group.name)
        .await
        .with_context(|| format!("listing registries in {}", group.name))?;

    let (matching, others): (Vec<Registry>, Vec<Registry>) = registries
        .into_iter()
        .partition(|r| r.name.eq_ignore_ascii_case(name));

    if let Some(registry) = matching.into_iter().next() {
        return Ok(Resolved::Existing(registry));
    }

    if !others.is_empty() {
        let names: Vec<&str> = others.iter().map(|r| r.name.as_str()).collect();
        reporter.warn(&format!(
            "resource group {} holds registry {} but not {name}; creating {name}",
            group.name,
            names.join(", ")
        ));
    }

    reporter.step(&format!("creating container registry {name}..."));
    let registry = api
        .create_registry(
            session,
            &RegistrySpec {
                resource_group: &group.name,
                name,
                location: &group.location,
                sku,
            },
        )
        .await
        .with_context(|| format!("creating container registry {name}"))?;
    Ok(Resolved::Created(registry))
}

/// Look up the vault, creating it when absent. An existing vault is never
/// modified; missing deployment flags only produce a warning.
///
/// # Errors
///
/// Returns an error if the lookup or create call fails.
pub async fn ensure_vault(
    api: &impl VaultApi,
    session: &Session,
    group: &ResourceGroup,
    name: &str,
    reporter: &impl ProgressReporter,
) -> Result<Resolved<Vault>> {
    if let Some(vault) = api
        .get_vault(session, &group.name, name)
        .await
        .with_context(|| format!("looking up key vault {name}"))?
    {
        if !vault.enabled_for_deployment {
            reporter.warn(&format!(
                "key vault {name} is not enabled for deployment; VMs cannot fetch the cluster certificate"
            ));
        }
        if !vault.enabled_for_template_deployment {
            reporter.warn(&format!(
                "key vault {name} is not enabled for template deployment"
            ));
        }
        return Ok(Resolved::Existing(vault));
    }

    reporter.step(&format!("creating key vault {name}..."));
    let vault = api
        .create_vault(session, &group.name, name, &group.location)
        .await
        .with_context(|| format!("creating key vault {name}"))?;
    Ok(Resolved::Created(vault))
}

/// Look up the cluster certificate in the vault, issuing a self-signed one
/// when absent.
///
/// # Errors
///
/// Returns an error if the lookup or create call fails.
pub async fn ensure_certificate(
    api: &impl CertificateApi,
    session: &Session,
    vault: &Vault,
    name: &str,
    dns_name: &str,
    reporter: &impl ProgressReporter,
) -> Result<Resolved<Certificate>> {
    if let Some(cert) = api
        .get_certificate(session, &vault.name, name)
        .await
        .with_context(|| format!("looking up certificate {name}"))?
    {
        return Ok(Resolved::Existing(cert));
    }

    reporter.step(&format!("issuing self-signed certificate for {dns_name}..."));
    let cert = api
        .create_self_signed_certificate(
            session,
            &CertificateSpec {
                vault_name: &vault.name,
                name,
                dns_name,
                validity_months: CERTIFICATE_VALIDITY_MONTHS,
            },
        )
        .await
        .with_context(|| format!("creating certificate {name}"))?;
    Ok(Resolved::Created(cert))
}
