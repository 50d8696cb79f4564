//! Application service — admin credential resolution.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, SecretApi};
use crate::domain::password::{PasswordPolicy, generate_password};
use crate::domain::resources::{AdminCredentials, Resolved, Session, Vault};

/// Where the admin credentials come from and where the password lives.
pub struct CredentialRequest<'a> {
    pub username: &'a str,
    /// Password given by the user; stored in the vault when present.
    pub password: Option<&'a str>,
    pub secret_name: &'a str,
    pub policy: PasswordPolicy,
}

/// Resolve the admin password against the vault.
///
/// 1. An explicit password is written to the secret and used.
/// 2. Otherwise an existing secret value is reused untouched.
/// 3. Otherwise a new password is generated and written.
///
/// `Resolved::Created` means the secret was written during this call.
///
/// # Errors
///
/// Returns an error if a vault call fails or the policy is invalid.
pub async fn ensure_admin_credentials(
    secrets: &impl SecretApi,
    session: &Session,
    vault: &Vault,
    req: &CredentialRequest<'_>,
    reporter: &impl ProgressReporter,
) -> Result<Resolved<AdminCredentials>> {
    let creds = |password: String| AdminCredentials {
        username: req.username.to_string(),
        password,
        secret_name: req.secret_name.to_string(),
    };

    if let Some(password) = req.password {
        reporter.step(&format!(
            "storing supplied admin password in {}/{}...",
            vault.name, req.secret_name
        ));
        store(secrets, session, vault, req.secret_name, password).await?;
        return Ok(Resolved::Created(creds(password.to_string())));
    }

    if let Some(existing) = secrets
        .get_secret(session, &vault.name, req.secret_name)
        .await
        .with_context(|| format!("looking up secret {}", req.secret_name))?
    {
        return Ok(Resolved::Existing(creds(existing)));
    }

    reporter.step("generating admin password...");
    let password = generate_password(&req.policy)?;
    store(secrets, session, vault, req.secret_name, &password).await?;
    Ok(Resolved::Created(creds(password)))
}

async fn store(
    secrets: &impl SecretApi,
    session: &Session,
    vault: &Vault,
    name: &str,
    value: &str,
) -> Result<()> {
    secrets
        .set_secret(session, &vault.name, name, value)
        .await
        .with_context(|| format!("storing secret {name} in {}", vault.name))
}
