//! Application service — authentication and subscription selection.

use anyhow::{Context, Result};

use crate::application::ports::{Authenticator, ProgressReporter};
use crate::domain::resources::Session;

fn matches_subscription(session: &Session, subscription: &str) -> bool {
    session.subscription_id.eq_ignore_ascii_case(subscription)
        || session.subscription_name == subscription
}

/// Establish an authenticated session bound to `subscription`.
///
/// Reuses an existing login when one is present and only runs the
/// interactive login when there is none. The returned `Session` is the only
/// carrier of identity for the rest of the run.
///
/// # Errors
///
/// Returns an error if login or subscription selection fails.
pub async fn establish_session(
    auth: &impl Authenticator,
    subscription: &str,
    reporter: &impl ProgressReporter,
) -> Result<Session> {
    let current = auth
        .current_account()
        .await
        .context("checking Azure login")?;

    if current.is_none() {
        reporter.step("signing in to Azure...");
        auth.login().await?;
    }

    if let Some(session) = current.filter(|s| matches_subscription(s, subscription)) {
        tracing::debug!(subscription = %session.subscription_id, "reusing active subscription");
        return Ok(session);
    }

    reporter.step(&format!("selecting subscription {subscription}..."));
    let session = auth
        .select_subscription(subscription)
        .await
        .with_context(|| format!("selecting subscription {subscription}"))?;
    Ok(session)
}
