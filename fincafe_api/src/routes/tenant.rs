//! Reads served from a farm's own database

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use fincafe_tenancy::db::entities::{permissions, roles, users};
use fincafe_tenancy::TenantQueryExt;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::Serialize;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRef {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
}

impl From<permissions::Model> for PermissionRef {
    fn from(p: permissions::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            resource: p.resource,
            action: p.action,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionRef>,
    pub user_count: usize,
    pub permission_count: usize,
    pub created_at: DateTimeWithTimeZone,
}

/// GET /api/farm/{code}/roles
pub async fn list_roles(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<RoleSummary>>, ApiError> {
    let tenant = state.registry.resolve_active(&code).await?;
    let db = state.service.get_connection(&tenant.database_name).await?;

    let roles = roles::Entity::find()
        .order_by_desc(roles::Column::CreatedAt)
        .order_by_asc(roles::Column::Name)
        .find_with_related(permissions::Entity)
        .all(db.orm())
        .await
        .for_tenant(&tenant.database_name)?;

    let role_ids: Vec<Option<String>> = users::Entity::find()
        .select_only()
        .column(users::Column::RoleId)
        .into_tuple::<Option<String>>()
        .all(db.orm())
        .await
        .for_tenant(&tenant.database_name)?;

    let mut user_counts: HashMap<String, usize> = HashMap::new();
    for role_id in role_ids.into_iter().flatten() {
        *user_counts.entry(role_id).or_default() += 1;
    }

    let summaries = roles
        .into_iter()
        .map(|(role, perms)| RoleSummary {
            user_count: user_counts.get(&role.id).copied().unwrap_or(0),
            permission_count: perms.len(),
            permissions: perms.into_iter().map(PermissionRef::from).collect(),
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
        })
        .collect();

    Ok(Json(summaries))
}

/// GET /api/farm/{code}/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<permissions::Model>>, ApiError> {
    let tenant = state.registry.resolve_active(&code).await?;
    let db = state.service.get_connection(&tenant.database_name).await?;

    let permissions = permissions::Entity::find()
        .order_by_asc(permissions::Column::Resource)
        .order_by_asc(permissions::Column::Action)
        .all(db.orm())
        .await
        .for_tenant(&tenant.database_name)?;

    Ok(Json(permissions))
}
