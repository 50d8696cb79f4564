//! Application service — template deployment submission.

use anyhow::{Context, Result};

use crate::application::ports::{
    DeploymentApi, DeploymentRequest, DeploymentResult, ProgressReporter,
};
use crate::domain::error::ProvisionError;
use crate::domain::resources::Session;

/// Inline template parameter carrying the VM instance count.
pub const VM_INSTANCE_COUNT_PARAM: &str = "vmInstanceCount";

/// Submit the deployment and wait for its terminal state.
///
/// The provider's result is returned verbatim on success. Any terminal
/// state other than `Succeeded` becomes `DeploymentFailed`.
///
/// # Errors
///
/// Returns an error if submission fails or the deployment does not succeed.
pub async fn submit_deployment(
    api: &impl DeploymentApi,
    session: &Session,
    request: &DeploymentRequest<'_>,
    reporter: &impl ProgressReporter,
) -> Result<DeploymentResult> {
    reporter.step(&format!(
        "deploying {} into {} (this can take a while)...",
        request.template_file.display(),
        request.resource_group
    ));
    tracing::info!(
        deployment = request.name,
        resource_group = request.resource_group,
        parameters = request.parameters.len(),
        "submitting template deployment"
    );

    let result = api
        .deploy(session, request)
        .await
        .with_context(|| format!("deployment {}", request.name))?;

    if !result.succeeded() {
        return Err(ProvisionError::DeploymentFailed {
            name: result.name,
            state: result.provisioning_state,
        }
        .into());
    }
    Ok(result)
}
