/// Issued bearer tokens
///
/// Every JWT handed out at register/login has a row here keyed by its `jti`.
/// The auth layer only accepts a token while its row exists, which is what
/// makes logout effective for an otherwise stateless JWT.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_tokens (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Name recorded for tokens issued by the login and register endpoints
pub const AUTH_TOKEN_NAME: &str = "auth-token";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessToken {
    /// Token ID (the JWT `jti`)
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Label for the issuing client
    pub name: String,

    pub created_at: DateTime<Utc>,

    /// Last time the auth layer accepted this token
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Records a freshly issued token
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, created_at, last_used_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Marks the token as used, returning false if it was revoked
    ///
    /// The user check guards against a `jti` being replayed under another `sub`.
    pub async fn touch(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE access_tokens
            SET last_used_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes a single token
    pub async fn revoke(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token of a user except `keep`
    ///
    /// Used after a password change so other sessions must log in again.
    pub async fn revoke_others(pool: &PgPool, user_id: Uuid, keep: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1 AND id <> $2")
            .bind(user_id)
            .bind(keep)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
