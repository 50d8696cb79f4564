//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::config::CaasConfig;
use crate::domain::parameters::ParameterTable;
use crate::domain::resources::{Certificate, Registry, ResourceGroup, Session, Vault};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Create parameters for a container registry.
pub struct RegistrySpec<'a> {
    pub resource_group: &'a str,
    pub name: &'a str,
    pub location: &'a str,
    /// `Basic`, `Standard` or `Premium`.
    pub sku: &'a str,
}

/// Create parameters for a self-signed vault certificate.
pub struct CertificateSpec<'a> {
    pub vault_name: &'a str,
    pub name: &'a str,
    /// Subject and sole DNS SAN, e.g. `prod.westeurope.cloudapp.azure.com`.
    pub dns_name: &'a str,
    pub validity_months: u32,
}

/// A template deployment submission.
pub struct DeploymentRequest<'a> {
    pub name: &'a str,
    pub resource_group: &'a str,
    pub template_file: &'a Path,
    pub parameters: &'a ParameterTable,
    /// Inline `key=value` parameters passed alongside the parameter table.
    pub overrides: Vec<(String, String)>,
}

/// Terminal state of a template deployment as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentResult {
    pub id: String,
    pub name: String,
    pub provisioning_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// When the deployment reached its terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub outputs: serde_json::Value,
}

impl DeploymentResult {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.provisioning_state.eq_ignore_ascii_case("Succeeded")
    }
}

// ── Provider Port Traits ──────────────────────────────────────────────────────

/// Identity and subscription selection.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    /// The signed-in account, or `None` if there is no usable login.
    async fn current_account(&self) -> Result<Option<Session>>;
    /// Run an interactive login.
    async fn login(&self) -> Result<()>;
    /// Make `subscription` (id or name) the active one and return the session.
    async fn select_subscription(&self, subscription: &str) -> Result<Session>;
}

/// Resource group lookup and creation.
#[allow(async_fn_in_trait)]
pub trait ResourceGroupApi {
    async fn get_resource_group(&self, session: &Session, name: &str)
    -> Result<Option<ResourceGroup>>;
    async fn create_resource_group(
        &self,
        session: &Session,
        name: &str,
        location: &str,
    ) -> Result<ResourceGroup>;
}

/// Container registry lookup and creation.
#[allow(async_fn_in_trait)]
pub trait RegistryApi {
    /// All registries in the resource group.
    async fn list_registries(&self, session: &Session, resource_group: &str)
    -> Result<Vec<Registry>>;
    async fn create_registry(&self, session: &Session, spec: &RegistrySpec<'_>)
    -> Result<Registry>;
}

/// Key vault lookup and creation.
#[allow(async_fn_in_trait)]
pub trait VaultApi {
    async fn get_vault(
        &self,
        session: &Session,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<Vault>>;
    /// Create a vault enabled for deployment and template deployment.
    async fn create_vault(
        &self,
        session: &Session,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<Vault>;
}

/// Vault certificate lookup and issuance.
#[allow(async_fn_in_trait)]
pub trait CertificateApi {
    async fn get_certificate(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<Certificate>>;
    async fn create_self_signed_certificate(
        &self,
        session: &Session,
        spec: &CertificateSpec<'_>,
    ) -> Result<Certificate>;
}

/// Vault secret lookup and storage.
#[allow(async_fn_in_trait)]
pub trait SecretApi {
    async fn get_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<String>>;
    async fn set_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
        value: &str,
    ) -> Result<()>;
}

/// Template deployment submission. Blocks until a terminal state.
#[allow(async_fn_in_trait)]
pub trait DeploymentApi {
    async fn deploy(
        &self,
        session: &Session,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult>;
}

/// Composite trait — any type implementing every provider port.
pub trait CloudProvider:
    Authenticator + ResourceGroupApi + RegistryApi + VaultApi + CertificateApi + SecretApi + DeploymentApi
{
}

/// Blanket implementation: any type implementing all provider ports is a `CloudProvider`.
impl<T> CloudProvider for T where
    T: Authenticator
        + ResourceGroupApi
        + RegistryApi
        + VaultApi
        + CertificateApi
        + SecretApi
        + DeploymentApi
{
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Interaction Ports ─────────────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

/// Asks the user for missing input.
pub trait InputPrompt {
    /// Prompt for a line of text. Returns `None` when prompting is not
    /// possible (non-interactive mode).
    fn ask(&self, prompt: &str) -> Result<Option<String>>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    fn load(&self) -> Result<CaasConfig>;
    fn save(&self, config: &CaasConfig) -> Result<()>;
    fn path(&self) -> Result<PathBuf>;
}
