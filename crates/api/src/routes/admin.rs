//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Permissions are enforced by handler extractors.
///
/// ```text
/// GET  /users              -> list_users   (user:list)
/// PUT  /users/{id}/role    -> set_role     (user:set-role)
/// POST /users/{id}/ban     -> ban_user     (user:ban)
/// POST /users/{id}/unban   -> unban_user   (user:ban)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::set_role))
        .route("/users/{id}/ban", post(admin::ban_user))
        .route("/users/{id}/unban", post(admin::unban_user))
}
