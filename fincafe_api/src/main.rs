use std::sync::Arc;

use anyhow::Context;
use fincafe_api::{app, AppState};
use fincafe_common::{info, init_from_settings, warn, Settings};
use fincafe_tenancy::{FarmRegistry, TenancyService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env()?;
    init_from_settings(&settings.log_level, "fincafe-api", settings.log_dir.as_ref());

    let registry = FarmRegistry::connect(&settings.database_url, &settings.tenant_db_prefix)
        .await
        .context("failed to open the control-plane database")?;
    info!("Control-plane database connected and migrations applied");

    let service = Arc::new(TenancyService::from_settings(&settings)?);
    let state = AppState::new(service.clone(), registry.clone());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", settings.bind_addr))?;
    info!("FinCafe API listening on {}", settings.bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database connections");
    service.close_all().await;
    if let Err(e) = registry.database().close().await {
        warn!("Failed to close control-plane connection: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
