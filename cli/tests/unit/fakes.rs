//! Shared in-memory fakes for the provider and interaction ports.
//!
//! `FakeCloud` keeps resources in `Mutex`-guarded maps and records every
//! call, so tests can assert on what was created and in which order.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use caas_deploy::application::ports::{
    Authenticator, CertificateApi, CertificateSpec, DeploymentApi, DeploymentRequest,
    DeploymentResult, InputPrompt, ProgressReporter, RegistryApi, RegistrySpec, ResourceGroupApi,
    SecretApi, VaultApi,
};
use caas_deploy::domain::config::CaasConfig;
use caas_deploy::domain::parameters::ParameterTable;
use caas_deploy::domain::request::{ProvisionInput, ProvisionRequest};
use caas_deploy::domain::resources::{Certificate, Registry, ResourceGroup, Session, Vault};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

pub fn session() -> Session {
    Session {
        subscription_id: SUBSCRIPTION.to_string(),
        subscription_name: "Dev".to_string(),
        tenant_id: "tenant".to_string(),
        user: "ops@example.com".to_string(),
    }
}

/// What the fake saw for one deployment submission.
#[derive(Debug, Clone)]
pub struct DeployRecord {
    pub name: String,
    pub resource_group: String,
    pub parameters: ParameterTable,
    pub overrides: Vec<(String, String)>,
}

// ── FakeCloud ─────────────────────────────────────────────────────────────────

pub struct FakeCloud {
    account: Mutex<Option<Session>>,
    groups: Mutex<HashMap<String, ResourceGroup>>,
    registries: Mutex<Vec<(String, Registry)>>,
    vaults: Mutex<HashMap<String, Vault>>,
    certificates: Mutex<HashMap<(String, String), Certificate>>,
    secrets: Mutex<HashMap<(String, String), String>>,
    deployment_state: Mutex<String>,
    calls: Mutex<Vec<String>>,
    sessions: Mutex<Vec<String>>,
    deployments: Mutex<Vec<DeployRecord>>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCloud {
    /// Signed in to `SUBSCRIPTION`, no resources, deployments succeed.
    pub fn new() -> Self {
        Self {
            account: Mutex::new(Some(session())),
            groups: Mutex::new(HashMap::new()),
            registries: Mutex::new(Vec::new()),
            vaults: Mutex::new(HashMap::new()),
            certificates: Mutex::new(HashMap::new()),
            secrets: Mutex::new(HashMap::new()),
            deployment_state: Mutex::new("Succeeded".to_string()),
            calls: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
            deployments: Mutex::new(Vec::new()),
        }
    }

    pub fn logged_out(self) -> Self {
        *self.account.lock().unwrap() = None;
        self
    }

    pub fn with_group(self, name: &str, location: &str) -> Self {
        self.groups
            .lock()
            .unwrap()
            .insert(name.to_string(), group(name, location));
        self
    }

    pub fn with_registry(self, resource_group: &str, name: &str) -> Self {
        self.registries
            .lock()
            .unwrap()
            .push((resource_group.to_string(), registry(name, "westeurope")));
        self
    }

    pub fn with_vault(self, name: &str) -> Self {
        self.vaults
            .lock()
            .unwrap()
            .insert(name.to_string(), vault(name, "westeurope"));
        self
    }

    pub fn with_certificate(self, vault_name: &str, name: &str) -> Self {
        self.certificates.lock().unwrap().insert(
            (vault_name.to_string(), name.to_string()),
            certificate(vault_name, name),
        );
        self
    }

    /// A certificate whose thumbprint is empty, as a half-issued one would be.
    pub fn with_certificate_missing_thumbprint(self, vault_name: &str, name: &str) -> Self {
        self.certificates.lock().unwrap().insert(
            (vault_name.to_string(), name.to_string()),
            Certificate {
                thumbprint: String::new(),
                ..certificate(vault_name, name)
            },
        );
        self
    }

    pub fn with_secret(self, vault_name: &str, name: &str, value: &str) -> Self {
        self.secrets
            .lock()
            .unwrap()
            .insert((vault_name.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn with_deployment_state(self, state: &str) -> Self {
        *self.deployment_state.lock().unwrap() = state.to_string();
        self
    }

    /// Every call in order, as `"<operation> <name>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Mutating calls only, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("create") || c.starts_with("set_secret"))
            .collect()
    }

    /// Subscription id seen by each resource call.
    pub fn sessions(&self) -> Vec<String> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn deployments(&self) -> Vec<DeployRecord> {
        self.deployments.lock().unwrap().clone()
    }

    pub fn secret(&self, vault_name: &str, name: &str) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(vault_name.to_string(), name.to_string()))
            .cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn record_session(&self, session: &Session, call: String) {
        self.sessions
            .lock()
            .unwrap()
            .push(session.subscription_id.clone());
        self.record(call);
    }
}

pub fn group(name: &str, location: &str) -> ResourceGroup {
    ResourceGroup {
        id: format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{name}"),
        name: name.to_string(),
        location: location.to_string(),
    }
}

pub fn registry(name: &str, location: &str) -> Registry {
    Registry {
        id: format!("/registries/{name}"),
        name: name.to_string(),
        login_server: format!("{}.azurecr.io", name.to_ascii_lowercase()),
        location: location.to_string(),
    }
}

pub fn vault(name: &str, location: &str) -> Vault {
    Vault {
        id: format!("/vaults/{name}"),
        name: name.to_string(),
        uri: format!("https://{name}.vault.azure.net/"),
        location: location.to_string(),
        enabled_for_deployment: true,
        enabled_for_template_deployment: true,
    }
}

pub fn certificate(vault_name: &str, name: &str) -> Certificate {
    Certificate {
        id: format!("https://{vault_name}.vault.azure.net/certificates/{name}/v1"),
        name: name.to_string(),
        thumbprint: "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678".to_string(),
        secret_id: format!("https://{vault_name}.vault.azure.net/secrets/{name}/v1"),
    }
}

impl Authenticator for FakeCloud {
    async fn current_account(&self) -> Result<Option<Session>> {
        self.record("current_account".to_string());
        Ok(self.account.lock().unwrap().clone())
    }

    async fn login(&self) -> Result<()> {
        self.record("login".to_string());
        *self.account.lock().unwrap() = Some(Session {
            subscription_id: "default-sub".to_string(),
            ..session()
        });
        Ok(())
    }

    async fn select_subscription(&self, subscription: &str) -> Result<Session> {
        self.record(format!("select_subscription {subscription}"));
        if subscription != SUBSCRIPTION && subscription != "Dev" {
            anyhow::bail!("subscription {subscription} not found");
        }
        let s = session();
        *self.account.lock().unwrap() = Some(s.clone());
        Ok(s)
    }
}

impl ResourceGroupApi for FakeCloud {
    async fn get_resource_group(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<ResourceGroup>> {
        self.record_session(session, format!("get_resource_group {name}"));
        Ok(self.groups.lock().unwrap().get(name).cloned())
    }

    async fn create_resource_group(
        &self,
        session: &Session,
        name: &str,
        location: &str,
    ) -> Result<ResourceGroup> {
        self.record_session(session, format!("create_resource_group {name}"));
        let g = group(name, location);
        self.groups
            .lock()
            .unwrap()
            .insert(name.to_string(), g.clone());
        Ok(g)
    }
}

impl RegistryApi for FakeCloud {
    async fn list_registries(
        &self,
        session: &Session,
        resource_group: &str,
    ) -> Result<Vec<Registry>> {
        self.record_session(session, format!("list_registries {resource_group}"));
        Ok(self
            .registries
            .lock()
            .unwrap()
            .iter()
            .filter(|(rg, _)| rg == resource_group)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_registry(
        &self,
        session: &Session,
        spec: &RegistrySpec<'_>,
    ) -> Result<Registry> {
        self.record_session(session, format!("create_registry {}", spec.name));
        let r = registry(spec.name, spec.location);
        self.registries
            .lock()
            .unwrap()
            .push((spec.resource_group.to_string(), r.clone()));
        Ok(r)
    }
}

impl VaultApi for FakeCloud {
    async fn get_vault(
        &self,
        session: &Session,
        _resource_group: &str,
        name: &str,
    ) -> Result<Option<Vault>> {
        self.record_session(session, format!("get_vault {name}"));
        Ok(self.vaults.lock().unwrap().get(name).cloned())
    }

    async fn create_vault(
        &self,
        session: &Session,
        _resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<Vault> {
        self.record_session(session, format!("create_vault {name}"));
        let v = vault(name, location);
        self.vaults
            .lock()
            .unwrap()
            .insert(name.to_string(), v.clone());
        Ok(v)
    }
}

impl CertificateApi for FakeCloud {
    async fn get_certificate(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<Certificate>> {
        self.record_session(session, format!("get_certificate {name}"));
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .get(&(vault_name.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_self_signed_certificate(
        &self,
        session: &Session,
        spec: &CertificateSpec<'_>,
    ) -> Result<Certificate> {
        self.record_session(session, format!("create_certificate {}", spec.name));
        let c = certificate(spec.vault_name, spec.name);
        self.certificates.lock().unwrap().insert(
            (spec.vault_name.to_string(), spec.name.to_string()),
            c.clone(),
        );
        Ok(c)
    }
}

impl SecretApi for FakeCloud {
    async fn get_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
    ) -> Result<Option<String>> {
        self.record_session(session, format!("get_secret {name}"));
        Ok(self.secret(vault_name, name))
    }

    async fn set_secret(
        &self,
        session: &Session,
        vault_name: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        self.record_session(session, format!("set_secret {name}"));
        self.secrets
            .lock()
            .unwrap()
            .insert((vault_name.to_string(), name.to_string()), value.to_string());
        Ok(())
    }
}

impl DeploymentApi for FakeCloud {
    async fn deploy(
        &self,
        session: &Session,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult> {
        self.record_session(session, format!("deploy {}", request.name));
        self.deployments.lock().unwrap().push(DeployRecord {
            name: request.name.to_string(),
            resource_group: request.resource_group.to_string(),
            parameters: request.parameters.clone(),
            overrides: request.overrides.clone(),
        });
        Ok(DeploymentResult {
            id: format!("/deployments/{}", request.name),
            name: request.name.to_string(),
            provisioning_state: self.deployment_state.lock().unwrap().clone(),
            correlation_id: Some("corr-1".to_string()),
            timestamp: None,
            outputs: serde_json::Value::Null,
        })
    }
}

// ── Interaction fakes ─────────────────────────────────────────────────────────

/// Records every reported event as `"step: ..."`, `"success: ..."` or `"warn: ..."`.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().unwrap().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(format!("warn: {message}"));
    }
}

/// Non-interactive prompt: never answers.
pub struct NoPrompt;

impl InputPrompt for NoPrompt {
    fn ask(&self, _: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Interactive prompt that always answers with the given text.
pub struct AnswerPrompt(pub &'static str);

impl InputPrompt for AnswerPrompt {
    fn ask(&self, _: &str) -> Result<Option<String>> {
        Ok(Some(self.0.to_string()))
    }
}

// ── Request builder ───────────────────────────────────────────────────────────

pub const RESOURCE_GROUP: &str = "caas-rg";
pub const CLUSTER: &str = "prod";
pub const VAULT: &str = "prodkv";
pub const REGISTRY: &str = "prodacr";
pub const SECRET: &str = "prod-admin-password";
pub const CERT: &str = "prod-cert";

pub fn input(location: Option<&str>) -> ProvisionInput {
    ProvisionInput {
        subscription: Some(SUBSCRIPTION.to_string()),
        resource_group: RESOURCE_GROUP.to_string(),
        location: location.map(str::to_string),
        cluster_name: CLUSTER.to_string(),
        vault_name: VAULT.to_string(),
        registry_name: REGISTRY.to_string(),
        template_file: Some(PathBuf::from("SFDeployTemplate.json")),
        ..ProvisionInput::default()
    }
}

pub fn request(location: Option<&str>) -> ProvisionRequest {
    input(location)
        .resolve(&CaasConfig::default())
        .expect("valid request")
}
