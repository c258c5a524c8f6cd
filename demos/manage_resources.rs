//! Manage resources and resource groups: create, tag and delete a resource
//! group, put a key vault into it through the generic resource API and export
//! the group as an ARM template.
//!
//! Expects `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` and
//! `AZURE_SUBSCRIPTION_ID` in the environment or in a `.env` file.
//! Set `RUST_LOG=azure_sdk_resources=debug` to trace the requests on stderr.

use anyhow::Context;
use azure_sdk_resources::{run_walkthrough, ResourceManagementClient, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load().context("Failed to read settings")?;
    tracing::info!(settings = ?settings, "starting walkthrough");

    let http_client = settings.http_client()?;
    let mut client = ResourceManagementClient::new_with_environment(
        &settings.client_id,
        &settings.client_secret,
        &settings.tenant_id,
        &settings.subscription_id,
        settings.environment.clone(),
    )
    .with_http_client(http_client);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_walkthrough(&mut client, &settings, &mut out)
        .await
        .with_context(|| format!("Walkthrough failed for resource group {}", settings.resource_group))?;

    Ok(())
}
