//! Infrastructure implementation of the cloud provider ports.
//!
//! `AzCliProvider<R>` routes every provider call through the Azure CLI
//! (`az`) via a `CommandRunner`. Each resource command carries the
//! subscription from the `Session` it was given, so no command depends on
//! whatever subscription happens to be active in the user's `az` profile.

use std::io::Write as _;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::ports::{
    Authenticator, CertificateApi, CertificateSpec, CommandRunner, DeploymentApi,
    DeploymentRequest, DeploymentResult, RegistryApi, RegistrySpec, ResourceGroupApi, SecretApi,
    VaultApi,
};
use crate::domain::error::ProvisionError;
use crate::domain::resources::{Certificate, Registry, ResourceGroup, Session, Vault};
use crate::infra::command_runner::TokioCommandRunner;

/// Azure CLI executable.
pub const AZ: &str = "az";

/// Default wait for a template deployment to reach a terminal state.
pub const DEFAULT_DEPLOYMENT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// stderr fragments the Azure CLI emits when a looked-up resource is absent.
const NOT_FOUND_MARKERS: &[&str] = &["NotFound", "could not be found", "was not found"];

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountJson {
    id: String,
    name: String,
    tenant_id: String,
    #[serde(default)]
    user: Option<AccountUserJson>,
}

#[derive(Debug, Deserialize)]
struct AccountUserJson {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GroupJson {
    id: String,
    name: String,
    location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryJson {
    id: String,
    name: String,
    login_server: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct VaultJson {
    id: String,
    name: String,
    location: String,
    properties: VaultPropertiesJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultPropertiesJson {
    #[serde(default)]
    vault_uri: String,
    #[serde(default)]
    enabled_for_deployment: Option<bool>,
    #[serde(default)]
    enabled_for_template_deployment: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateJson {
    id: String,
    name: String,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    x509_thumbprint_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecretJson {
    value: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentJson {
    id: String,
    name: String,
    properties: DeploymentPropertiesJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentPropertiesJson {
    provisioning_state: String,
    #[serde(default)]
    correlation_id: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    outputs: Option<Value>,
}

impl From<AccountJson> for Session {
    fn from(a: AccountJson) -> Self {
        Self {
            subscription_id: a.id,
            subscription_name: a.name,
            tenant_id: a.tenant_id,
            user: a.user.map(|u| u.name).unwrap_or_default(),
        }
    }
}

impl From<GroupJson> for ResourceGroup {
    fn from(g: GroupJson) -> Self {
        Self {
            id: g.id,
            name: g.name,
            location: g.location,
        }
    }
}

impl From<RegistryJson> for Registry {
    fn from(r: RegistryJson) -> Self {
        Self {
            id: r.id,
            name: r.name,
            login_server: r.login_server,
            location: r.location,
        }
    }
}

impl From<VaultJson> for Vault {
    fn from(v: VaultJson) -> Self {
        Self {
            id: v.id,
            name: v.name,
            uri: v.properties.vault_uri,
            location: v.location,
            enabled_for_deployment: v.properties.enabled_for_deployment.unwrap_or(false),
            enabled_for_template_deployment: v
                .properties
                .enabled_for_template_deployment
                .unwrap_or(false),
        }
    }
}

impl TryFrom<CertificateJson> for Certificate {
    type Error = anyhow::Error;

    fn try_from(c: CertificateJson) -> Result<Self> {
        let missing = |field: &str| ProvisionError::ProviderCommand {
            operation: format!("reading certificate {}", c.name),
            detail: format!("response has no {field}"),
        };
        let thumbprint = c
            .x509_thumbprint_hex
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("x509ThumbprintHex"))?;
        let secret_id = c
            .sid
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("sid"))?;
        Ok(Self {
            id: c.id,
            name: c.name,
            thumbprint,
            secret_id,
        })
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn is_not_found(output: &Output) -> bool {
    let err = String::from_utf8_lossy(&output.stderr);
    NOT_FOUND_MARKERS.iter().any(|m| err.contains(m))
}

fn ensure_success(output: &Output, operation: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(ProvisionError::ProviderCommand {
        operation: operation.to_string(),
        detail: stderr_text(output),
    }
    .into())
}

fn parse_json<T: DeserializeOwned>(output: &Output, operation: &str) -> Result<T> {
    ensure_success(output, operation)?;
    serde_json::from_slice(&output.stdout)
        .with_context(|| format!("{operation}: unexpected response from az"))
}

/// Parse a lookup response: `Ok(None)` when the resource does not exist.
fn parse_lookup<T: DeserializeOwned>(output: &Output, operation: &str) -> Result<Option<T>> {
    if !output.status.success() && is_not_found(output) {
        return Ok(None);
    }
    parse_json(output, operation).map(Some)
}

/// Write `content` to a private temp file for `@file` style arguments.
fn temp_file(content: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("caas-")
        .suffix(".json")
        .tempfile()
        .context("creating temp file")?;
    file.write_all(content).context("writing temp file")?;
    file.flush().context("flushing temp file")?;
    Ok(file)
}

fn path_str(file: &tempfile::NamedTempFile) -> Result<String> {
    file.path()
        .to_str()
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("temp file path is not valid UTF-8"))
}

/// Key vault certificate policy for a self-signed server certificate.
#[must_use]
pub fn self_signed_policy(spec: &CertificateSpec<'_>) -> Value {
    json!({
        "issuerParameters": { "name": "Self" },
        "keyProperties": {
            "exportable": true,
            "keyType": "RSA",
            "keySize": 2048,
            "reuseKey": false
        },
        "secretProperties": { "contentType": "application/x-pkcs12" },
        "x509CertificateProperties": {
            "subject": format!("CN={}", spec.dns_name),
            "subjectAlternativeNames": { "dnsNames": [spec.dns_name] },
            "keyUsage": ["digitalSignature", "keyEncipherment"],
            "ekus": ["1.3.6.1.5.5.7.3.1", "1.3.6.1.5.5.7.3.2"],
            "validityInMonths": spec.validity_months
        },
        "lifetimeActions": [{
            "action": { "actionType": "AutoRenew" },
            "trigger": { "daysBeforeExpiry": 30 }
        }]
    })
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// Infrastructure adapter that routes all provider calls through `az`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AzCliProvider<R: CommandRunner> {
    runner: R,
    deployment_timeout: Duration,
}

impl<R: CommandRunner> AzCliProvider<R> {
    pub fn new(runner: R, deployment_timeout: Duration) -> Self {
        Self {
            runner,
            deployment_timeout,
        }
    }

    /// Run `az <args> --subscription <id> --output json --only-show-errors`.
    async fn az(&self, session: Option<&Session>, args: &[&str]) -> Result<Output> {
        let full = Self::full_args(session, args);
        let full: Vec<&str> = full.iter().map(String::as_str).collect();
        tracing::debug!(command = %args.iter().take(3).copied().collect::<Vec<_>>().join(" "), "az");
        self.runner
            .run(AZ, &full)
            .await
            .context("running az (is the Azure CLI installed?)")
    }

    fn full_args(session: Option<&Session>, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        if let Some(s) = session {
            full.push("--subscription".to_string());
            full.push(s.subscription_id.clone());
        }
        full.extend(["--output", "json", "--only-show-errors"].map(String::from));
        full
    }
}

impl AzCliProvider<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn with_timeouts(command: Duration, deployment: Duration) -> Self {
        Self::new(TokioCommandRunner::new(command), deployment)
    }
}

impl<R: CommandRunner> Authenticator for AzCliProvider<R> {
    async fn current_account(&self) -> Result<Option<Session>> {
        let output = self.az(None, &["account", "show"]).await?;
        if !output.status.success() {
            tracing::debug!(stderr = %stderr_text(&output), "no active az login");
            return Ok(None);
        }
        let account: AccountJson = parse_json(&output, "az account show")?;
        Ok(Some(account.into()))
    }

    async fn login(&self) -> Result<()> {
        let status = self
            .runner
            .run_status(AZ, &["login", "--only-show-errors", "--output", "none"])
            .await
            .context("running az login (is the Azure CLI installed?)")?;
        if !status.success() {
            return Err(ProvisionError::AuthFailed {
                detail: format!("az login exited with {status}"),
            }
            .into());
        }
        Ok(())
    }

    async fn select_subscription(&self, subscription: &str) -> Result<Session> {
        // `account show --subscription` leaves the user's default subscription alone
        let output = self
            .az(None, &["account", "show", "--subscription", subscription])
            .await?;
        if !output.status.success() {
            return Err(ProvisionError::AuthFailed {
                detail: stderr_text(&output),
            }
            .into());
        }
        let account: AccountJson = parse_json(&output, "az account show")?;
        Ok(account.into())
    }
}

impl<R: CommandRunner> ResourceGroupApi for AzCliProvider<R> {
    async fn get_resource_group(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<ResourceGroup>> {
        let output = self.az(Some(session), &["group", "show", "--name", name]).await?;
        Ok(parse_lookup::<GroupJson>(&output, "az group show")?.map(Into::into))
    }

    async fn create_resource_group(
        &self,
        session: &Session,
        name: &str,
        location: &str,
    ) -> Result<ResourceGroup> {
        let output = self
            .az(
                Some(session),
                &["group", "create", "--name", name, "--location", location],
            )
            .await?;
        Ok(parse_json::<GroupJson>(&output, "az group create")?.into())
    }
}

impl<R: CommandRunner> RegistryApi for AzCliProvider<R> {
    async fn list_registries(
        &self,
        session: &Session,
        resource_group: &str,
    ) -> Result<Vec<Registry>> {
        let output = self
            .az(
                Some(session),
                &["acr", "list", "--resource-group", resource_group],
            )
            .await?;
        let list: Vec<RegistryJson> = parse_json(&output, "az acr list")?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn create_registry(
        &self,
        session: &Session,
        spec: &RegistrySpec<'_>,
    ) -> Result<Registry> {
        let output = self
            .az(
                Some(session),
                &[
                    "acr",
                    "create",
                    "--resource-group",
                    spec.resource_group,
                    "--name",
                    spec.name,
                    "--location",
                    spec.location,
                    "--sku",
                    spec.sku,
                    "--admin-enabled",
                    "true",
                ],
            )
            .await?;
        Ok(parse_json::<RegistryJson>(&output, "az acr create")?.into())
    }
}

impl<R: CommandRunner> VaultApi for AzCliProvider<R> {
    async fn get_vault(
        &self,
        session: &Session,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<Vault>> {
        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "show",
                    "--resource-group",
                    resource_group,
                    "--name",
                    name,
                ],
            )
            .await?;
        Ok(parse_lookup::<VaultJson>(&output, "az keyvault show")?.map(Into::into))
    }

    async fn create_vault(
        &self,
        session: &Session,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<Vault> {
        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "create",
                    "--resource-group",
                    resource_group,
                    "--name",
                    name,
                    "--location",
                    location,
                    "--enabled-for-deployment",
                    "true",
                    "--enabled-for-template-deployment",
                    "true",
                ],
            )
            .await?;
        Ok(parse_json::<VaultJson>(&output, "az keyvault create")?.into())
    }
}

impl<R: CommandRunner> CertificateApi for AzCliProvider<R> {
    async fn get_certificate(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<Certificate>> {
        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "certificate",
                    "show",
                    "--vault-name",
                    vault_name,
                    "--name",
                    name,
                ],
            )
            .await?;
        parse_lookup::<CertificateJson>(&output, "az keyvault certificate show")?
            .map(Certificate::try_from)
            .transpose()
    }

    async fn create_self_signed_certificate(
        &self,
        session: &Session,
        spec: &CertificateSpec<'_>,
    ) -> Result<Certificate> {
        let policy = serde_json::to_vec(&self_signed_policy(spec))
            .context("serializing certificate policy")?;
        let policy_file = temp_file(&policy)?;
        let policy_arg = format!("@{}", path_str(&policy_file)?);

        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "certificate",
                    "create",
                    "--vault-name",
                    spec.vault_name,
                    "--name",
                    spec.name,
                    "--policy",
                    &policy_arg,
                ],
            )
            .await?;
        ensure_success(&output, "az keyvault certificate create")?;

        // create reports the pending operation; read back the issued certificate
        self.get_certificate(session, spec.vault_name, spec.name)
            .await?
            .ok_or_else(|| {
                ProvisionError::ProviderCommand {
                    operation: "az keyvault certificate create".to_string(),
                    detail: format!("certificate {} not found after creation", spec.name),
                }
                .into()
            })
    }
}

impl<R: CommandRunner> SecretApi for AzCliProvider<R> {
    async fn get_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<String>> {
        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "secret",
                    "show",
                    "--vault-name",
                    vault_name,
                    "--name",
                    name,
                ],
            )
            .await?;
        Ok(parse_lookup::<SecretJson>(&output, "az keyvault secret show")?.map(|s| s.value))
    }

    async fn set_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        // value goes through a 0600 temp file so it never appears in argv
        let file = temp_file(value.as_bytes())?;
        let path = path_str(&file)?;
        let output = self
            .az(
                Some(session),
                &[
                    "keyvault",
                    "secret",
                    "set",
                    "--vault-name",
                    vault_name,
                    "--name",
                    name,
                    "--file",
                    &path,
                    "--encoding",
                    "utf-8",
                ],
            )
            .await?;
        ensure_success(&output, "az keyvault secret set")
    }
}

impl<R: CommandRunner> DeploymentApi for AzCliProvider<R> {
    async fn deploy(
        &self,
        session: &Session,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult> {
        let template = request
            .template_file
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("template path is not valid UTF-8"))?;
        let document = serde_json::to_vec(&request.parameters.to_parameters_document())
            .context("serializing deployment parameters")?;
        let params_file = temp_file(&document)?;
        let params_arg = format!("@{}", path_str(&params_file)?);
        let overrides: Vec<String> = request
            .overrides
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        let mut args = vec![
            "deployment",
            "group",
            "create",
            "--resource-group",
            request.resource_group,
            "--name",
            request.name,
            "--template-file",
            template,
            "--parameters",
            &params_arg,
        ];
        for o in &overrides {
            args.push("--parameters");
            args.push(o);
        }

        let full = Self::full_args(Some(session), &args);
        let full: Vec<&str> = full.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout(AZ, &full, self.deployment_timeout)
            .await
            .context("running az deployment group create")?;

        let deployment: DeploymentJson = parse_json(&output, "az deployment group create")?;
        Ok(DeploymentResult {
            id: deployment.id,
            name: deployment.name,
            provisioning_state: deployment.properties.provisioning_state,
            correlation_id: deployment.properties.correlation_id,
            timestamp: deployment.properties.timestamp,
            outputs: deployment.properties.outputs.unwrap_or(Value::Null),
        })
    }
}
