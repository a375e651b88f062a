//! Farm provisioning trigger

use axum::{
    extract::{Path, State},
    Json,
};
use fincafe_tenancy::{tenant::validate_code, Provisioned, SeedSummary};
use serde::Serialize;
use fincafe_common::info;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    pub message: String,
    pub database_name: String,
    pub provisioned: Provisioned,
    pub applied_migrations: Vec<String>,
    pub seed: SeedSummary,
}

/// POST /api/farms/{code}/initialize
///
/// Creates, migrates and seeds the farm's database. Safe to call again after a
/// failure or on an already initialized farm.
pub async fn initialize_farm(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InitializeResponse>, ApiError> {
    validate_code(&code)?;
    let tenant = state
        .registry
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Farm '{code}' not found")))?;

    let report = state.service.initialize_tenant(&tenant).await?;
    info!("Initialized farm {} via API", code);

    Ok(Json(InitializeResponse {
        message: "Farm database initialized successfully".to_string(),
        database_name: report.database_name,
        provisioned: report.provisioned,
        applied_migrations: report.diagnostics.applied,
        seed: report.seed,
    }))
}
