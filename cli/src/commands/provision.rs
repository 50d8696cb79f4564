//! `caas-deploy provision` — resolve every cluster prerequisite and deploy.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::provision_cluster;
use crate::domain::error::ProvisionError;
use crate::domain::request::{ProvisionInput, ProvisionRequest};
use crate::output::{TerminalReporter, json};

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Subscription id or name (falls back to azure.subscription)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Resource group holding all cluster resources
    #[arg(long)]
    pub resource_group: String,

    /// Region for a new resource group (falls back to azure.location)
    #[arg(long)]
    pub location: Option<String>,

    /// Cluster name; also the DNS label and the base of derived names
    #[arg(long)]
    pub cluster_name: String,

    /// Key vault name
    #[arg(long)]
    pub vault_name: String,

    /// Container registry name
    #[arg(long)]
    pub registry_name: String,

    /// Number of cluster VMs (falls back to deployment.vm_instance_count)
    #[arg(long)]
    pub vm_instance_count: Option<u32>,

    /// Admin username (derived from the cluster name when omitted)
    #[arg(long)]
    pub admin_username: Option<String>,

    /// Admin password to store (generated when omitted and no secret exists)
    #[arg(long, env = "CAAS_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Deployment name (falls back to deployment.name)
    #[arg(long)]
    pub deployment_name: Option<String>,

    /// Cluster template file (falls back to deployment.template_file)
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    /// Registry SKU used when creating the registry (falls back to registry.sku)
    #[arg(long, value_parser = ["Basic", "Standard", "Premium"])]
    pub registry_sku: Option<String>,
}

impl From<ProvisionArgs> for ProvisionInput {
    fn from(args: ProvisionArgs) -> Self {
        Self {
            subscription: args.subscription,
            resource_group: args.resource_group,
            location: args.location,
            cluster_name: args.cluster_name,
            vault_name: args.vault_name,
            registry_name: args.registry_name,
            vm_instance_count: args.vm_instance_count,
            admin_username: args.admin_username,
            admin_password: args.admin_password,
            deployment_name: args.deployment_name,
            template_file: args.template_file,
            registry_sku: args.registry_sku,
        }
    }
}

/// Fails before any provider call when the template file is absent.
fn check_template(request: &ProvisionRequest) -> Result<()> {
    if !request.template_file.is_file() {
        return Err(
            ProvisionError::TemplateNotFound(request.template_file.display().to_string()).into(),
        );
    }
    Ok(())
}

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if input validation fails or any pipeline step fails.
pub async fn run(app: &AppContext, args: ProvisionArgs) -> Result<ExitCode> {
    let request = ProvisionInput::from(args).resolve(&app.config)?;
    check_template(&request)?;
    tracing::debug!(?request, "resolved provisioning request");

    app.output.header(&format!(
        "Provisioning cluster {} in {}",
        request.cluster_name, request.resource_group
    ));

    let provider = app.provider();
    let (outcome, warnings) = {
        let reporter = TerminalReporter::new(&app.output);
        let outcome = provision_cluster(&provider, app, &reporter, &request).await?;
        (outcome, reporter.warnings())
    };

    if app.is_json() {
        println!("{}", json::format_outcome(&outcome, &warnings)?);
    } else {
        app.output.render_outcome(&outcome);
    }
    Ok(ExitCode::SUCCESS)
}
