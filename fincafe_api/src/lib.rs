//! FinCafe HTTP API
//!
//! A thin axum layer over `fincafe_tenancy`: it triggers farm initialization and
//! serves tenant-scoped reads from each farm's own database.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use fincafe_tenancy::{FarmRegistry, TenancyService};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TenancyService>,
    pub registry: FarmRegistry,
}

impl AppState {
    pub fn new(service: Arc<TenancyService>, registry: FarmRegistry) -> Self {
        Self { service, registry }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/farms/{code}/initialize",
            post(routes::farms::initialize_farm),
        )
        .route("/api/farm/{code}/roles", get(routes::tenant::list_roles))
        .route(
            "/api/farm/{code}/permissions",
            get(routes::tenant::list_permissions),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
