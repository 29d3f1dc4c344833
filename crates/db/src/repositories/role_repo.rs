//! Repository for the seeded `roles` table.
//!
//! The set of roles is fixed by the first migration and mirrors
//! [`fibervision_core::roles::Role`]; rows are only ever read.

use std::collections::HashMap;

use fibervision_core::roles::Role as AccessRole;
use fibervision_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

/// Name reported for a `role_id` with no matching row.
pub const UNKNOWN_ROLE_NAME: &str = "unknown";

pub struct RoleRepo;

impl RoleRepo {
    /// The row backing an access role, `None` if the seed is missing.
    pub async fn find(pool: &PgPool, role: AccessRole) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at, updated_at FROM roles WHERE name = $1",
        )
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Every role name keyed by id, for resolving many users at once.
    pub async fn names_by_id(pool: &PgPool) -> Result<HashMap<DbId, String>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as("SELECT id, name FROM roles")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn resolve_name(pool: &PgPool, role_id: DbId) -> Result<String, sqlx::Error> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(pool)
            .await?;
        Ok(name.unwrap_or_else(|| UNKNOWN_ROLE_NAME.to_string()))
    }
}
