//! Admin account management route handlers. Super admin only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use roastline_core::AdminUserId;

use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireSuperAdmin;
use crate::models::{AdminRole, AdminUser};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Account creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub password: String,
}

/// Role change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: AdminRole,
}

/// Reject the change if it would leave the system without a super admin.
async fn guard_last_super_admin(
    repo: &AdminUserRepository<'_>,
    target: &AdminUser,
) -> Result<()> {
    if target.role == AdminRole::SuperAdmin
        && repo.count_by_role(AdminRole::SuperAdmin).await? <= 1
    {
        return Err(AppError::Conflict(
            "cannot remove the last super admin".to_string(),
        ));
    }

    Ok(())
}

/// List admin accounts.
///
/// GET /admin-users
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>> {
    let admins = AdminUserRepository::new(state.admin_pool())
        .list_all()
        .await?;

    Ok(Json(admins))
}

/// Create an admin account.
///
/// POST /admin-users
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminUser>)> {
    let auth = AdminAuthService::new(state.admin_pool());
    let created = auth
        .create_admin(&req.email, &req.name, req.role, &req.password)
        .await?;

    tracing::info!(created_id = %created.id, role = %created.role, "Admin account created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Change an account's role.
///
/// PATCH /admin-users/{id}/role
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn update_role(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<AdminUser>> {
    let repo = AdminUserRepository::new(state.admin_pool());

    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin user {id}")))?;

    // A demotion counts as removal for the last-super-admin rule
    if req.role != AdminRole::SuperAdmin {
        guard_last_super_admin(&repo, &target).await?;
    }

    let updated = repo.update_role(id, req.role).await?;

    tracing::info!(target_id = %id, role = %req.role, "Admin role changed");

    Ok(Json(updated))
}

/// Delete an account.
///
/// DELETE /admin-users/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn remove(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }

    let repo = AdminUserRepository::new(state.admin_pool());

    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin user {id}")))?;

    guard_last_super_admin(&repo, &target).await?;

    repo.delete(id).await?;

    tracing::info!(target_id = %id, "Admin account deleted");

    Ok(StatusCode::NO_CONTENT)
}
