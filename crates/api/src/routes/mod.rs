pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/signup                    signup
/// /auth/login                     login
/// /auth/refresh                   refresh
/// /auth/logout                    logout (requires auth)
/// /auth/me                        current user (requires auth)
/// /auth/verify-email              consume email verification link
/// /auth/resend-verification       re-send verification link
/// /auth/forgot-password           request password reset link
/// /auth/verify-reset-token        check a reset link (GET ?token=)
/// /auth/reset-password            consume reset link, set password
///
/// /admin/users                    list users (user:list)
/// /admin/users/{id}/role          change role (user:set-role)
/// /admin/users/{id}/ban           ban (user:ban)
/// /admin/users/{id}/unban         unban (user:ban)
///
/// /user/dashboard/layout          get, save (PUT), clear (DELETE)
/// /dashboard/widgets              widget catalog by category
/// /navigation                     role-filtered sidebar (auth optional)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication, sessions and email links.
        .nest("/auth", auth::router())
        // User management.
        .nest("/admin", admin::router())
        // Per-user dashboard layout.
        .nest("/user/dashboard", dashboard::user_router())
        // Widget catalog.
        .nest("/dashboard", dashboard::router())
        // Sidebar navigation.
        .route("/navigation", get(handlers::dashboard::navigation))
}
