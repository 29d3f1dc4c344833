//! Repository for the `verification_tokens` table.

use fibervision_core::types::DbId;
use sqlx::PgPool;

use crate::models::verification_token::{CreateVerificationToken, VerificationToken};

const COLUMNS: &str = "id, identifier, user_id, expires_at, created_at";

pub struct VerificationTokenRepo;

impl VerificationTokenRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateVerificationToken,
    ) -> Result<VerificationToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO verification_tokens (identifier, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(&input.identifier)
            .bind(input.user_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired token without consuming it.
    pub async fn find_valid(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_tokens
             WHERE identifier = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// Delete and return the token if it exists and has not expired.
    ///
    /// A token can be consumed at most once.
    pub async fn consume(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        let query = format!(
            "DELETE FROM verification_tokens
             WHERE identifier = $1 AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// Delete every token of one purpose (`prefix`) issued to a user.
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: DbId,
        prefix: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM verification_tokens
             WHERE user_id = $1 AND identifier LIKE $2 || ':%'",
        )
        .bind(user_id)
        .bind(prefix)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
