//! Per-user dashboard layout row.

use fibervision_core::types::{DbId, Timestamp};
use fibervision_core::widgets::{DashboardLayout, WidgetConfig};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `dashboard_layouts` table.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardLayoutRow {
    pub id: DbId,
    pub user_id: DbId,
    pub layout: Json<Vec<WidgetConfig>>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DashboardLayoutRow> for DashboardLayout {
    fn from(row: DashboardLayoutRow) -> Self {
        DashboardLayout {
            widgets: row.layout.0,
            version: row.version,
            updated_at: Some(row.updated_at),
        }
    }
}
