use anyhow::{Context, Result};
use colored::*;
use tracing::debug;

use crate::gcloud::Gcloud;

pub async fn login(gcloud: &Gcloud) -> Result<()> {
    println!("🔐 Authenticating with Google Cloud...");
    gcloud.ensure_installed()?;

    gcloud.login().await.context("gcloud auth login failed")?;
    println!("{}", "✅ Successfully authenticated with Google Cloud".green());

    // kubectl's GKE auth plugin reads application-default credentials.
    println!("🔧 Setting up application-default credentials...");
    if gcloud.application_default_login().await.is_err() {
        println!(
            "{}",
            "⚠️  Warning: Failed to set up application-default credentials".yellow()
        );
        return Ok(());
    }

    println!("{}", "✅ Authentication complete!".green());
    Ok(())
}

pub async fn logout(gcloud: &Gcloud) -> Result<()> {
    println!("🔐 Logging out from Google Cloud...");
    gcloud.ensure_installed()?;

    let account = match gcloud.active_account().await {
        Ok(Some(account)) => account,
        Ok(None) => {
            println!("{}", "⚠️  No active authentication found".yellow());
            return Ok(());
        }
        Err(e) => {
            debug!(error = %e, "active account lookup failed");
            println!("{}", "⚠️  No active authentication found".yellow());
            return Ok(());
        }
    };

    println!("🔓 Revoking credentials for: {}", account.cyan());
    gcloud
        .revoke(&account)
        .await
        .context("gcloud auth revoke failed")?;

    println!("{}", "✅ Successfully logged out from Google Cloud".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_requires_gcloud_on_path() {
        let err = login(&Gcloud::new("gcpeasy-no-such-gcloud")).await.unwrap_err();
        assert!(err.to_string().contains("CLI not found"));
    }

    #[tokio::test]
    async fn logout_requires_gcloud_on_path() {
        let err = logout(&Gcloud::new("gcpeasy-no-such-gcloud")).await.unwrap_err();
        assert!(err.to_string().contains("CLI not found"));
    }

    #[tokio::test]
    async fn logout_without_active_account_succeeds() {
        // `true` prints nothing, so there is no active account to revoke.
        logout(&Gcloud::new("true")).await.unwrap();
    }
}
