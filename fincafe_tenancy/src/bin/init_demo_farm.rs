//! Register the demo farm and initialize its database

use anyhow::Context;
use fincafe_common::{info, init_from_settings, warn, Settings};
use fincafe_tenancy::{FarmRegistry, TenancyService};

const DEMO_CODE: &str = "demo-farm";
const DEMO_NAME: &str = "Demo Farm";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_from_settings(&settings.log_level, "init-demo-farm", settings.log_dir.as_ref());

    let registry = FarmRegistry::connect(&settings.database_url, &settings.tenant_db_prefix)
        .await
        .context("failed to open the control-plane database")?;
    let service = TenancyService::from_settings(&settings)?;

    let tenant = registry
        .ensure_registered(DEMO_CODE, DEMO_NAME, Some("Demonstration coffee farm"))
        .await?;
    let report = service
        .initialize_tenant(&tenant)
        .await
        .with_context(|| format!("failed to initialize {}", tenant.database_name))?;

    info!(
        "Demo farm ready: database {} ({:?}), {} migration(s) applied",
        report.database_name,
        report.provisioned,
        report.diagnostics.applied.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    service.close_all().await;
    if let Err(e) = registry.database().close().await {
        warn!("Failed to close control-plane connection: {}", e);
    }
    Ok(())
}
