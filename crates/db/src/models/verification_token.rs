//! Single-use verification tokens (email confirmation, password reset).

use fibervision_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `verification_tokens` table.
///
/// `identifier` is `<purpose>:<token hash>`; the raw token is only ever
/// sent to the user.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    pub id: DbId,
    pub identifier: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

pub struct CreateVerificationToken {
    pub identifier: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}
