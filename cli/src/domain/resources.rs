//! Resource handles and naming rules.
//!
//! Handles describe resources owned by the cloud provider; this crate never
//! persists them. Naming helpers are the single place where defaults are
//! derived from the cluster name.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use crate::domain::error::ProvisionError;

/// Resource group names: 1-90 chars of word chars, `-`, `.`, `(`, `)`.
pub static RESOURCE_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[-\w.()]{0,89}[-\w()]$").expect("valid regex")
});

/// Container registry names: 5-50 alphanumerics.
pub static REGISTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9]{5,50}$").expect("valid regex")
});

/// Key vault names: 3-24 chars, letter first, no trailing or double hyphen.
pub static VAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]{1,22}[a-zA-Z0-9]$").expect("valid regex")
});

/// Cluster names become part of a DNS label. Case is free; derived DNS names
/// and usernames are lowercased.
pub static CLUSTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$").expect("valid regex")
});

/// Longest prefix kept from the cluster name when deriving a username.
pub const USERNAME_PREFIX_MAX: usize = 15;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Authenticated provider session. Every provider call receives one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub subscription_id: String,
    pub subscription_name: String,
    pub tenant_id: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    pub id: String,
    pub name: String,
    pub login_server: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub location: String,
    pub enabled_for_deployment: bool,
    pub enabled_for_template_deployment: bool,
}

/// A vault certificate. `secret_id` is the URL templates reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub thumbprint: String,
    pub secret_id: String,
}

/// Admin username/password pair backed by a vault secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    pub secret_name: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("secret_name", &self.secret_name)
            .finish()
    }
}

/// Outcome of a lookup-or-create step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Existing(T),
    Created(T),
}

impl<T> Resolved<T> {
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    #[must_use]
    pub fn get(&self) -> &T {
        match self {
            Self::Existing(v) | Self::Created(v) => v,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Existing(v) | Self::Created(v) => v,
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

fn check(re: &Regex, kind: &'static str, name: &str, rule: &'static str) -> Result<()> {
    if !re.is_match(name) {
        return Err(ProvisionError::InvalidName {
            kind,
            name: name.to_string(),
            rule,
        }
        .into());
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if `name` is not a valid resource group name.
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    check(
        &RESOURCE_GROUP_RE,
        "resource group",
        name,
        "1-90 letters, digits, '-', '_', '.', '(' or ')', not ending in '.'",
    )
}

/// # Errors
///
/// Returns an error if `name` is not a valid registry name.
pub fn validate_registry_name(name: &str) -> Result<()> {
    check(&REGISTRY_RE, "registry", name, "5-50 letters or digits")
}

/// # Errors
///
/// Returns an error if `name` is not a valid vault name.
pub fn validate_vault_name(name: &str) -> Result<()> {
    check(
        &VAULT_RE,
        "vault",
        name,
        "3-24 letters, digits or '-', starting with a letter",
    )?;
    if name.contains("--") {
        return Err(ProvisionError::InvalidName {
            kind: "vault",
            name: name.to_string(),
            rule: "consecutive hyphens are not allowed",
        }
        .into());
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if `name` is not a valid cluster name.
pub fn validate_cluster_name(name: &str) -> Result<()> {
    check(
        &CLUSTER_RE,
        "cluster",
        name,
        "letters, digits and '-', at most 63 chars, no leading or trailing '-'",
    )
}

// ── Default resolution ────────────────────────────────────────────────────────

/// Derive the admin username from the cluster name.
///
/// Keeps the lowercase ASCII alphanumerics of the cluster name, truncated to
/// [`USERNAME_PREFIX_MAX`], followed by `admin`.
///
/// # Errors
///
/// Returns an error if the cluster name has no alphanumeric characters.
pub fn derive_admin_username(cluster_name: &str) -> Result<String> {
    let prefix: String = cluster_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(USERNAME_PREFIX_MAX)
        .collect();
    if prefix.is_empty() {
        return Err(ProvisionError::UnderivableUsername(cluster_name.to_string()).into());
    }
    Ok(format!("{prefix}admin"))
}

/// Vault-safe form of the cluster name: non-alphanumerics become `-`.
#[must_use]
pub fn vault_object_stem(cluster_name: &str) -> String {
    cluster_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Name of the vault secret holding the admin password.
#[must_use]
pub fn admin_secret_name(cluster_name: &str) -> String {
    format!("{}-admin-password", vault_object_stem(cluster_name))
}

/// Name of the cluster certificate inside the vault.
#[must_use]
pub fn certificate_name(cluster_name: &str) -> String {
    format!("{}-cert", vault_object_stem(cluster_name))
}

/// Public DNS name of the cluster endpoint, used as the certificate subject.
#[must_use]
pub fn cluster_dns_name(cluster_name: &str, location: &str) -> String {
    format!(
        "{}.{}.cloudapp.azure.com",
        cluster_name.to_ascii_lowercase(),
        normalize_location(location)
    )
}

/// Canonical region form: lowercase, no spaces (`"West Europe"` → `"westeurope"`).
#[must_use]
pub fn normalize_location(location: &str) -> String {
    location
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
