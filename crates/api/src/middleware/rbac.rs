//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role lacks
//! the required `(resource, action)` grant from [`fibervision_core::roles`].
//! Authorization is therefore enforced at the type level in handler
//! signatures.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fibervision_core::error::CoreError;
use fibervision_core::roles::{Action, Resource};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Reject with 403 unless `user`'s role grants `action` on `resource`.
pub fn ensure_permission(user: &AuthUser, resource: Resource, action: Action) -> Result<(), AppError> {
    match user.role() {
        Some(role) if role.has_permission(resource, action) => Ok(()),
        _ => Err(AppError::Core(CoreError::Forbidden(format!(
            "Permission {resource:?}:{action:?} required"
        )))),
    }
}

/// Defines a newtype extractor around [`AuthUser`] that requires one grant.
macro_rules! permission_extractor {
    ($(#[$meta:meta])* $name:ident, $resource:expr, $action:expr) => {
        $(#[$meta])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                ensure_permission(&user, $resource, $action)?;
                Ok($name(user))
            }
        }
    };
}

permission_extractor!(
    /// Requires `dashboard:view`. Every role has it; unknown roles do not.
    RequireDashboardView,
    Resource::Dashboard,
    Action::View
);

permission_extractor!(
    /// Requires `user:list`.
    RequireUserList,
    Resource::User,
    Action::List
);

permission_extractor!(
    /// Requires `user:set-role`.
    RequireUserSetRole,
    Resource::User,
    Action::SetRole
);

permission_extractor!(
    /// Requires `user:ban` (covers unban as well).
    RequireUserBan,
    Resource::User,
    Action::Ban
);

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`], named for route signatures where
/// "this route requires authentication" should read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
