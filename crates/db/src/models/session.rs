//! Refresh-token session model.

use fibervision_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_sessions` table. Each row backs exactly one
/// refresh token; the token itself is only stored as a hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
