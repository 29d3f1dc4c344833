//! Handlers for the dashboard: per-user widget layout, widget catalog and
//! navigation.
//!
//! The layout endpoints answer with the flat shapes the dashboard client
//! expects rather than the `{ data }` envelope:
//!
//! ```text
//! GET    -> { "layout": [...], "version": 3, "updatedAt": "..." }
//! PUT    -> { "success": true, "version": 4 }
//! DELETE -> { "success": true }
//! ```

use axum::extract::State;
use axum::Json;
use fibervision_core::grid::GridOptions;
use fibervision_core::navigation::{self, NavGroup};
use fibervision_core::registry::{self, CategoryListing};
use fibervision_core::types::Timestamp;
use fibervision_core::widgets::{validate_widgets, DashboardLayout, WidgetConfig};
use fibervision_db::repositories::DashboardLayoutRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::RequireDashboardView;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub layout: Vec<WidgetConfig>,
    pub version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl From<DashboardLayout> for LayoutResponse {
    fn from(layout: DashboardLayout) -> Self {
        Self {
            layout: layout.widgets,
            version: layout.version,
            updated_at: layout.updated_at,
        }
    }
}

/// Request body for `PUT /user/dashboard/layout`. A missing `layout` saves
/// an empty dashboard.
#[derive(Debug, Deserialize)]
pub struct SaveLayoutRequest {
    #[serde(default)]
    pub layout: Vec<WidgetConfig>,
}

#[derive(Debug, Serialize)]
pub struct SaveLayoutResponse {
    pub success: bool,
    pub version: i32,
}

#[derive(Debug, Serialize)]
pub struct ClearLayoutResponse {
    pub success: bool,
}

/// Everything the widget picker needs.
#[derive(Debug, Serialize)]
pub struct WidgetCatalog {
    pub grid: GridOptions,
    pub categories: Vec<CategoryListing>,
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// GET /api/v1/user/dashboard/layout
///
/// The caller's saved layout, or an empty version-1 layout if none exists.
pub async fn get_layout(
    State(state): State<AppState>,
    RequireDashboardView(user): RequireDashboardView,
) -> AppResult<Json<LayoutResponse>> {
    let layout = DashboardLayoutRepo::find_by_user(&state.pool, user.user_id)
        .await?
        .map(DashboardLayout::from)
        .unwrap_or_default();
    Ok(Json(layout.into()))
}

/// PUT /api/v1/user/dashboard/layout
///
/// Replace the caller's layout wholesale and bump its version.
pub async fn save_layout(
    State(state): State<AppState>,
    RequireDashboardView(user): RequireDashboardView,
    Json(input): Json<SaveLayoutRequest>,
) -> AppResult<Json<SaveLayoutResponse>> {
    validate_widgets(&input.layout)?;

    let row = DashboardLayoutRepo::save(&state.pool, user.user_id, &input.layout).await?;

    tracing::info!(
        user_id = user.user_id,
        widgets = input.layout.len(),
        version = row.version,
        "Dashboard layout saved",
    );

    Ok(Json(SaveLayoutResponse {
        success: true,
        version: row.version,
    }))
}

/// DELETE /api/v1/user/dashboard/layout
///
/// Remove the caller's layout. Succeeds whether or not one existed.
pub async fn clear_layout(
    State(state): State<AppState>,
    RequireDashboardView(user): RequireDashboardView,
) -> AppResult<Json<ClearLayoutResponse>> {
    let existed = DashboardLayoutRepo::delete_by_user(&state.pool, user.user_id).await?;
    tracing::info!(user_id = user.user_id, existed, "Dashboard layout cleared");
    Ok(Json(ClearLayoutResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Catalog and navigation
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/widgets
///
/// Widget definitions grouped by category, plus the grid options.
pub async fn widget_catalog(
    RequireDashboardView(_user): RequireDashboardView,
) -> Json<DataResponse<WidgetCatalog>> {
    Json(DataResponse {
        data: WidgetCatalog {
            grid: GridOptions::default(),
            categories: registry::categories(),
        },
    })
}

/// GET /api/v1/navigation
///
/// The sidebar tree as the caller's role sees it. Anonymous callers get the
/// unrestricted nodes only.
pub async fn navigation(MaybeAuthUser(user): MaybeAuthUser) -> Json<DataResponse<Vec<NavGroup>>> {
    let role = user.as_ref().and_then(|u| u.role());
    Json(DataResponse {
        data: navigation::filter(&navigation::default_navigation(), role),
    })
}
