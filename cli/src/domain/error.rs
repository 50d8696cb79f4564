//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors raised while resolving inputs, provisioning resources, or deploying.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Azure authentication failed: {detail}")]
    AuthFailed { detail: String },

    #[error("No subscription given. Pass --subscription or run: caas-deploy config set azure.subscription <id>")]
    MissingSubscription,

    #[error(
        "Resource group '{resource_group}' does not exist and no location was given. Pass --location <region>."
    )]
    MissingRegion { resource_group: String },

    #[error("Invalid {kind} name '{name}': {rule}")]
    InvalidName {
        kind: &'static str,
        name: String,
        rule: &'static str,
    },

    #[error("Cannot derive an admin username from cluster name '{0}'. Pass --admin-username.")]
    UnderivableUsername(String),

    #[error("Invalid password policy: {0}")]
    InvalidPasswordPolicy(String),

    #[error("Required deployment parameter '{key}' is missing.")]
    MissingParameter { key: &'static str },

    #[error("Deployment parameter '{key}' was already set.")]
    DuplicateParameter { key: String },

    #[error("Template file not found: {0}")]
    TemplateNotFound(String),

    #[error("{operation} failed: {detail}")]
    ProviderCommand { operation: String, detail: String },

    #[error("Deployment '{name}' finished in state '{state}'.")]
    DeploymentFailed { name: String, state: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
