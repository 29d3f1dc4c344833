//! User entity model and DTOs.

use fibervision_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash: never serialize this to API responses.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub password_hash: String,
    pub role_id: DbId,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    /// Resolved role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    pub role_id: DbId,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: User, role: impl Into<String>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            email_verified: user.email_verified,
            role: role.into(),
            role_id: user.role_id,
            banned: user.banned,
            ban_reason: user.ban_reason,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}
