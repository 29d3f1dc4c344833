//! Repository for the `dashboard_layouts` table.

use fibervision_core::types::DbId;
use fibervision_core::widgets::{WidgetConfig, INITIAL_LAYOUT_VERSION};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::dashboard_layout::DashboardLayoutRow;

const COLUMNS: &str = "id, user_id, layout, version, created_at, updated_at";

/// One layout row per user, replaced wholesale.
pub struct DashboardLayoutRepo;

impl DashboardLayoutRepo {
    /// Find a user's layout. `None` until the first save.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<DashboardLayoutRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dashboard_layouts WHERE user_id = $1");
        sqlx::query_as::<_, DashboardLayoutRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's layout.
    ///
    /// The first save creates the row at [`INITIAL_LAYOUT_VERSION`]; every
    /// later save bumps the stored version by exactly one. Concurrent saves serialize on the
    /// `user_id` unique constraint and the last one wins.
    pub async fn save(
        pool: &PgPool,
        user_id: DbId,
        widgets: &[WidgetConfig],
    ) -> Result<DashboardLayoutRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO dashboard_layouts (user_id, layout, version) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
             SET layout = EXCLUDED.layout, \
                 version = dashboard_layouts.version + 1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardLayoutRow>(&query)
            .bind(user_id)
            .bind(Json(widgets))
            .bind(INITIAL_LAYOUT_VERSION)
            .fetch_one(pool)
            .await
    }

    /// Delete a user's layout. Returns `true` if a row existed.
    pub async fn delete_by_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboard_layouts WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
