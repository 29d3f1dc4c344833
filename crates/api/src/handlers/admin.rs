//! Handlers for the `/admin` resource (user management).
//!
//! Each handler requires a specific `user:*` permission via the extractors in
//! [`crate::middleware::rbac`].

use axum::extract::{Path, State};
use axum::Json;
use fibervision_core::error::CoreError;
use fibervision_core::roles::Role;
use fibervision_core::types::DbId;
use fibervision_db::models::user::UserResponse;
use fibervision_db::repositories::role_repo::UNKNOWN_ROLE_NAME;
use fibervision_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireUserBan, RequireUserList, RequireUserSetRole};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_BAN_REASON_LENGTH: usize = 500;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Request body for `POST /admin/users/{id}/ban`. The body may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct BanRequest {
    pub reason: Option<String>,
}

/// GET /api/v1/admin/users
///
/// All users, newest first, with role names resolved.
pub async fn list_users(
    State(state): State<AppState>,
    RequireUserList(_admin): RequireUserList,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;

    let role_names = RoleRepo::names_by_id(&state.pool).await?;

    let data = users
        .into_iter()
        .map(|user| {
            let role = role_names
                .get(&user.role_id)
                .map_or(UNKNOWN_ROLE_NAME, String::as_str)
                .to_string();
            UserResponse::from_user(user, role)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Change a user's role. Admins cannot change their own role.
pub async fn set_role(
    State(state): State<AppState>,
    RequireUserSetRole(admin): RequireUserSetRole,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot change your own role".into(),
        )));
    }

    let role = RoleRepo::find(&state.pool, input.role)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{}' is not seeded", input.role)))?;

    let user = UserRepo::set_role(&state.pool, id, role.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(admin_id = admin.user_id, user_id = id, role = %input.role, "Role changed");

    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, role.name),
    }))
}

/// POST /api/v1/admin/users/{id}/ban
///
/// Ban a user and revoke all of their sessions.
pub async fn ban_user(
    State(state): State<AppState>,
    RequireUserBan(admin): RequireUserBan,
    Path(id): Path<DbId>,
    body: Option<Json<BanRequest>>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot ban yourself".into(),
        )));
    }

    let Json(input) = body.unwrap_or_default();
    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    if reason.is_some_and(|r| r.chars().count() > MAX_BAN_REASON_LENGTH) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "reason: Ban reason must be at most {MAX_BAN_REASON_LENGTH} characters"
        ))));
    }

    let user = UserRepo::ban(&state.pool, id, reason)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(admin_id = admin.user_id, user_id = id, revoked, "User banned");

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, role),
    }))
}

/// POST /api/v1/admin/users/{id}/unban
pub async fn unban_user(
    State(state): State<AppState>,
    RequireUserBan(admin): RequireUserBan,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::unban(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(admin_id = admin.user_id, user_id = id, "User unbanned");

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, role),
    }))
}
