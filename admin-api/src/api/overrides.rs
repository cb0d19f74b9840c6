use access_control::{PermissionSet, Role};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::RequestGate;
use crate::AppState;

/// Only administrators manage overrides, whatever their permission set says.
const OVERRIDE_ADMINS: [Role; 2] = [Role::SuperAdmin, Role::Admin];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/overrides", get(list_overrides))
        .route(
            "/overrides/:principal_id",
            get(get_override).put(put_override).delete(delete_override),
        )
}

#[derive(Debug, Serialize)]
pub struct OverrideResponse {
    pub principal_id: String,
    pub permissions: PermissionSet,
}

async fn list_overrides(
    State(state): State<AppState>,
    gate: RequestGate,
) -> Result<Json<Vec<OverrideResponse>>> {
    gate.require_role(&OVERRIDE_ADMINS).await.into_result()?;

    let overrides = state
        .resolver
        .overrides()
        .list()
        .await?
        .into_iter()
        .map(|(principal_id, permissions)| OverrideResponse {
            principal_id,
            permissions,
        })
        .collect();

    Ok(Json(overrides))
}

async fn get_override(
    State(state): State<AppState>,
    gate: RequestGate,
    Path(principal_id): Path<String>,
) -> Result<Json<OverrideResponse>> {
    gate.require_role(&OVERRIDE_ADMINS).await.into_result()?;

    let permissions = state
        .resolver
        .overrides()
        .get(&principal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No override for {}", principal_id)))?;

    Ok(Json(OverrideResponse {
        principal_id,
        permissions,
    }))
}

async fn put_override(
    State(state): State<AppState>,
    gate: RequestGate,
    Path(principal_id): Path<String>,
    Json(permissions): Json<PermissionSet>,
) -> Result<Json<OverrideResponse>> {
    let admin = gate.require_role(&OVERRIDE_ADMINS).await.into_result()?;

    state
        .resolver
        .overrides()
        .put(&principal_id, permissions.clone())
        .await?;

    tracing::info!(
        admin = %admin.id,
        principal = %principal_id,
        wildcard = permissions.has_wildcard(),
        "Permission override stored"
    );

    Ok(Json(OverrideResponse {
        principal_id,
        permissions,
    }))
}

async fn delete_override(
    State(state): State<AppState>,
    gate: RequestGate,
    Path(principal_id): Path<String>,
) -> Result<StatusCode> {
    let admin = gate.require_role(&OVERRIDE_ADMINS).await.into_result()?;

    if !state.resolver.overrides().remove(&principal_id).await? {
        return Err(AppError::NotFound(format!("No override for {}", principal_id)));
    }

    tracing::info!(admin = %admin.id, principal = %principal_id, "Permission override removed");
    Ok(StatusCode::NO_CONTENT)
}
