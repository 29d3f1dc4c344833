//! Route definitions for the dashboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/user/dashboard`.
///
/// ```text
/// GET    /layout  -> get_layout
/// PUT    /layout  -> save_layout
/// DELETE /layout  -> clear_layout
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new().route(
        "/layout",
        get(dashboard::get_layout)
            .put(dashboard::save_layout)
            .delete(dashboard::clear_layout),
    )
}

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /widgets -> widget_catalog
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/widgets", get(dashboard::widget_catalog))
}
