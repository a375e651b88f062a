//! Bring every active farm database up to the current schema

use anyhow::{bail, Context};
use fincafe_common::{error, info, init_from_settings, warn, Settings};
use fincafe_tenancy::{FarmRegistry, TenancyService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_from_settings(&settings.log_level, "migrate-tenants", settings.log_dir.as_ref());

    let registry = FarmRegistry::connect(&settings.database_url, &settings.tenant_db_prefix)
        .await
        .context("failed to open the control-plane database")?;
    let service = TenancyService::from_settings(&settings)?;

    let outcomes = service.migrate_all_active(&registry).await?;
    service.close_all().await;
    if let Err(e) = registry.database().close().await {
        warn!("Failed to close control-plane connection: {}", e);
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => info!(
                "{} ({}): ok, {} migration(s) applied",
                outcome.code,
                outcome.database_name,
                report.diagnostics.applied.len()
            ),
            Err(e) => {
                failed += 1;
                error!("{} ({}): {}", outcome.code, outcome.database_name, e);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} farm(s) failed to migrate", outcomes.len());
    }
    info!("All {} farm(s) migrated", outcomes.len());
    Ok(())
}
