use access_control::{
    has_permission_str, visible_sections, Action, DashboardSection, PermissionSet, Resource, Role,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::RequestGate;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_principal))
        .route("/check", get(check_permission))
        .route("/roles", get(list_roles))
        .route("/roles/:role", get(get_role))
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub known_role: bool,
    pub permissions: PermissionSet,
    pub sections: Vec<DashboardSection>,
}

async fn get_current_principal(gate: RequestGate) -> Result<Json<PrincipalResponse>> {
    let principal = gate.require_session().await.into_result()?;

    Ok(Json(PrincipalResponse {
        known_role: principal.role().is_some(),
        sections: visible_sections(&principal.permissions),
        id: principal.id,
        email: principal.email,
        role: principal.role,
        permissions: principal.permissions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub resource: String,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub resource: String,
    pub action: String,
    pub allowed: bool,
}

/// Raw names pass through unchanged: an unknown or empty action is a deny,
/// not a bad request.
async fn check_permission(
    gate: RequestGate,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>> {
    let principal = gate.require_session().await.into_result()?;
    let action = query
        .action
        .unwrap_or_else(|| Action::default().as_str().to_string());

    let allowed = has_permission_str(Some(&principal.permissions), &query.resource, &action);

    Ok(Json(CheckResponse {
        resource: query.resource,
        action,
        allowed,
    }))
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
    pub permissions: PermissionSet,
}

async fn list_roles(
    State(state): State<AppState>,
    gate: RequestGate,
) -> Result<Json<Vec<RoleResponse>>> {
    gate.require_permission(Resource::Settings, Some(Action::Read))
        .await
        .into_result()?;

    let roles = state
        .resolver
        .table()
        .iter()
        .map(|(role, permissions)| RoleResponse {
            role: *role,
            permissions: permissions.clone(),
        })
        .collect();

    Ok(Json(roles))
}

async fn get_role(
    State(state): State<AppState>,
    gate: RequestGate,
    Path(role): Path<String>,
) -> Result<Json<RoleResponse>> {
    gate.require_permission(Resource::Settings, Some(Action::Read))
        .await
        .into_result()?;

    let role: Role = role
        .parse()
        .map_err(|_| AppError::NotFound(format!("Role not found: {}", role)))?;
    let permissions = state
        .resolver
        .table()
        .get(role)
        .cloned()
        .unwrap_or_default();

    Ok(Json(RoleResponse { role, permissions }))
}
