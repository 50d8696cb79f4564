//! Application service — the cluster provisioning pipeline.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Steps run strictly in order, each taking the outputs of the earlier ones:
//!
//! 1. authenticate → `Session`
//! 2. resource group → `ResourceGroup`
//! 3. registry → `Registry`
//! 4. vault → `Vault`
//! 5. certificate → `Certificate`
//! 6. credentials → `AdminCredentials`
//! 7. assemble → `ParameterTable`
//! 8. deploy → `DeploymentResult`

use anyhow::Result;

use crate::application::ports::{
    CloudProvider, DeploymentRequest, DeploymentResult, InputPrompt, ProgressReporter,
};
use crate::application::services::credentials::{CredentialRequest, ensure_admin_credentials};
use crate::application::services::deploy::{VM_INSTANCE_COUNT_PARAM, submit_deployment};
use crate::application::services::resolve::{
    ensure_certificate, ensure_registry, ensure_resource_group, ensure_vault,
};
use crate::application::services::session::establish_session;
use crate::domain::parameters::{AssemblyInputs, ParameterTable, assemble_parameters};
use crate::domain::password::PasswordPolicy;
use crate::domain::request::ProvisionRequest;
use crate::domain::resources::{
    AdminCredentials, Certificate, Registry, Resolved, ResourceGroup, Session, Vault,
    cluster_dns_name,
};

/// Everything the pipeline resolved, created, and deployed.
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub session: Session,
    pub resource_group: Resolved<ResourceGroup>,
    pub registry: Resolved<Registry>,
    pub vault: Resolved<Vault>,
    pub certificate: Resolved<Certificate>,
    pub credentials: Resolved<AdminCredentials>,
    pub parameters: ParameterTable,
    pub deployment: DeploymentResult,
}

impl ProvisionOutcome {
    /// Names of the resources created during this run, in creation order.
    #[must_use]
    pub fn created(&self) -> Vec<String> {
        let mut created = Vec::new();
        if self.resource_group.was_created() {
            created.push(format!("resource group {}", self.resource_group.get().name));
        }
        if self.registry.was_created() {
            created.push(format!("registry {}", self.registry.get().name));
        }
        if self.vault.was_created() {
            created.push(format!("key vault {}", self.vault.get().name));
        }
        if self.certificate.was_created() {
            created.push(format!("certificate {}", self.certificate.get().name));
        }
        if self.credentials.was_created() {
            created.push(format!("secret {}", self.credentials.get().secret_name));
        }
        created
    }
}

fn announce<T>(reporter: &impl ProgressReporter, what: &str, resolved: &Resolved<T>) {
    match resolved {
        Resolved::Existing(_) => reporter.success(&format!("{what} found")),
        Resolved::Created(_) => reporter.success(&format!("{what} created")),
    }
}

/// Run the full provisioning pipeline for `request`.
///
/// Fails fast: the first error aborts the run and earlier resources are
/// left in place.
///
/// # Errors
///
/// Returns an error if any step fails.
pub async fn provision_cluster(
    provider: &impl CloudProvider,
    prompt: &impl InputPrompt,
    reporter: &impl ProgressReporter,
    request: &ProvisionRequest,
) -> Result<ProvisionOutcome> {
    // Step 1: authenticate.
    let session = establish_session(provider, &request.subscription, reporter).await?;
    reporter.success(&format!(
        "signed in as {} ({})",
        session.user, session.subscription_name
    ));

    // Step 2: resource group.
    let resource_group = ensure_resource_group(
        provider,
        &session,
        &request.resource_group,
        request.location.as_deref(),
        prompt,
        reporter,
    )
    .await?;
    announce(reporter, &format!("resource group {}", request.resource_group), &resource_group);
    let group = resource_group.get();

    // Step 3: container registry.
    let registry = ensure_registry(
        provider,
        &session,
        group,
        &request.registry_name,
        &request.registry_sku,
        reporter,
    )
    .await?;
    announce(reporter, &format!("container registry {}", request.registry_name), &registry);

    // Step 4: key vault.
    let vault = ensure_vault(provider, &session, group, &request.vault_name, reporter).await?;
    announce(reporter, &format!("key vault {}", request.vault_name), &vault);

    // Step 5: certificate.
    let dns_name = cluster_dns_name(&request.cluster_name, &group.location);
    let certificate = ensure_certificate(
        provider,
        &session,
        vault.get(),
        &request.certificate_name,
        &dns_name,
        reporter,
    )
    .await?;
    announce(reporter, &format!("certificate {}", request.certificate_name), &certificate);

    // Step 6: admin credentials.
    let credentials = ensure_admin_credentials(
        provider,
        &session,
        vault.get(),
        &CredentialRequest {
            username: &request.admin_username,
            password: request.admin_password.as_deref(),
            secret_name: &request.admin_secret_name,
            policy: PasswordPolicy::default(),
        },
        reporter,
    )
    .await?;
    announce(reporter, &format!("admin secret {}", request.admin_secret_name), &credentials);

    // Step 7: assemble parameters.
    let parameters = assemble_parameters(&AssemblyInputs {
        cluster_name: Some(&request.cluster_name),
        resource_group: Some(group),
        vault: Some(vault.get()),
        certificate: Some(certificate.get()),
        credentials: Some(credentials.get()),
    })?;

    // Step 8: deploy.
    let deployment = submit_deployment(
        provider,
        &session,
        &DeploymentRequest {
            name: &request.deployment_name,
            resource_group: &group.name,
            template_file: &request.template_file,
            parameters: &parameters,
            overrides: vec![(
                VM_INSTANCE_COUNT_PARAM.to_string(),
                request.vm_instance_count.to_string(),
            )],
        },
        reporter,
    )
    .await?;
    reporter.success(&format!("deployment {} succeeded", deployment.name));

    Ok(ProvisionOutcome {
        session,
        resource_group,
        registry,
        vault,
        certificate,
        credentials,
        parameters,
        deployment,
    })
}
