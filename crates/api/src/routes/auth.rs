//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup               -> signup
/// POST /login                -> login
/// POST /refresh              -> refresh
/// POST /logout               -> logout (requires auth)
/// GET  /me                   -> me (requires auth)
/// POST /verify-email         -> verify_email
/// POST /resend-verification  -> resend_verification
/// POST /forgot-password      -> forgot_password
/// GET  /verify-reset-token   -> verify_reset_token
/// POST /reset-password       -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/verify-reset-token", get(auth::verify_reset_token))
        .route("/reset-password", post(auth::reset_password))
}
