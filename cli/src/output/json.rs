//! JSON output helpers.
//!
//! The error object is what every `--json` code path prints when a command
//! fails; the provisioning summary is what a successful run prints.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::DeploymentResult;
use crate::application::services::provision::ProvisionOutcome;
use crate::domain::error::{ConfigError, ProvisionError};
use crate::domain::resources::{Certificate, Registry, ResourceGroup, Vault};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable code for an error, derived from its typed cause.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.chain().find_map(|c| c.downcast_ref::<ProvisionError>()) {
        return match e {
            ProvisionError::AuthFailed { .. } => "AUTH_FAILED",
            ProvisionError::MissingSubscription | ProvisionError::MissingRegion { .. } => {
                "MISSING_INPUT"
            }
            ProvisionError::InvalidName { .. }
            | ProvisionError::UnderivableUsername(_)
            | ProvisionError::InvalidPasswordPolicy(_) => "INVALID_INPUT",
            ProvisionError::MissingParameter { .. } | ProvisionError::DuplicateParameter { .. } => {
                "PARAMETER_ASSEMBLY"
            }
            ProvisionError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            ProvisionError::ProviderCommand { .. } => "PROVIDER_COMMAND",
            ProvisionError::DeploymentFailed { .. } => "DEPLOYMENT_FAILED",
        };
    }
    if err.chain().any(|c| c.downcast_ref::<ConfigError>().is_some()) {
        return "INVALID_CONFIG";
    }
    "ERROR"
}

#[derive(Serialize)]
struct Entry<'a, T> {
    created: bool,
    #[serde(flatten)]
    resource: &'a T,
}

#[derive(Serialize)]
struct AdminEntry<'a> {
    created: bool,
    username: &'a str,
    secret_name: &'a str,
}

#[derive(Serialize)]
struct Summary<'a> {
    subscription_id: &'a str,
    subscription_name: &'a str,
    resource_group: Entry<'a, ResourceGroup>,
    registry: Entry<'a, Registry>,
    vault: Entry<'a, Vault>,
    certificate: Entry<'a, Certificate>,
    admin: AdminEntry<'a>,
    parameters: std::collections::BTreeMap<String, String>,
    deployment: &'a DeploymentResult,
    warnings: &'a [String],
}

/// Format the provisioning summary, including any warnings raised during the
/// run. The admin password is never included.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_outcome(outcome: &ProvisionOutcome, warnings: &[String]) -> Result<String> {
    let summary = Summary {
        subscription_id: &outcome.session.subscription_id,
        subscription_name: &outcome.session.subscription_name,
        resource_group: Entry {
            created: outcome.resource_group.was_created(),
            resource: outcome.resource_group.get(),
        },
        registry: Entry {
            created: outcome.registry.was_created(),
            resource: outcome.registry.get(),
        },
        vault: Entry {
            created: outcome.vault.was_created(),
            resource: outcome.vault.get(),
        },
        certificate: Entry {
            created: outcome.certificate.was_created(),
            resource: outcome.certificate.get(),
        },
        admin: AdminEntry {
            created: outcome.credentials.was_created(),
            username: &outcome.credentials.get().username,
            secret_name: &outcome.credentials.get().secret_name,
        },
        parameters: outcome.parameters.redacted(),
        deployment: &outcome.deployment,
        warnings,
    };
    serde_json::to_string_pretty(&summary).context("JSON serialization failed")
}
