//! Command-line session runner: sign in, keep the session alive, sign out.

use anyhow::Context;
use shopdesk_auth::{GuardOutcome, Route, guard, navigation};
use shopdesk_client::{ClientConfig, SessionCore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopdesk_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    tracing::info!(api_url = %config.api_base_url, "starting session runner");

    let username = std::env::var("SHOPDESK_USERNAME").context("SHOPDESK_USERNAME must be set")?;
    let password = std::env::var("SHOPDESK_PASSWORD").context("SHOPDESK_PASSWORD must be set")?;

    let session = SessionCore::with_http(&config).context("failed to build HTTP transport")?;
    session.restore().await;

    let user = session
        .login(&username, &password)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;
    println!("Signed in as {} ({}, {})", user.full_name, user.role, user.privilege);

    let snapshot = session.snapshot();
    for route in navigation(&snapshot) {
        println!("  {:<10} {}", route.title(), route.path());
    }
    for route in [Route::Users, Route::Staff, Route::Analytics] {
        if let Some(required) = route.requirement() {
            if let GuardOutcome::Denied(denial) = guard(&snapshot, &required) {
                println!("  {:<10} {}", route.title(), denial.title);
            }
        }
    }

    let mut updates = session.subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            tracing::info!("interrupt received; signing out");
            session.logout().await;
        }
        _ = updates.wait_for(|snapshot| !snapshot.is_authenticated()) => {
            tracing::warn!("session ended by failed renewal");
        }
    }

    println!("Signed out");
    Ok(())
}
