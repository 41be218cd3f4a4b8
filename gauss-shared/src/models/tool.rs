/// User-owned developer tools
///
/// Every query here is scoped by `user_id`: a tool that exists but belongs to
/// someone else is indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tools (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
///     version VARCHAR(50) NOT NULL,
///     image_url VARCHAR(500),
///     roles TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tool {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,

    /// 1 to 5
    pub rating: i32,

    pub version: String,
    pub image_url: Option<String>,

    /// Job functions the tool is aimed at
    pub roles: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTool {
    pub name: String,
    pub description: String,
    pub rating: i32,
    pub version: String,
    pub image_url: Option<String>,
    pub roles: Vec<String>,
}

/// Partial tool update; `None` leaves the column alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTool {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i32>,
    pub version: Option<String>,

    /// `Some(None)` clears the image
    pub image_url: Option<Option<String>>,

    pub roles: Option<Vec<String>>,
}

impl Tool {
    pub async fn create(pool: &PgPool, user_id: Uuid, data: CreateTool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tool>(
            r#"
            INSERT INTO tools (user_id, name, description, rating, version, image_url, roles)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.rating)
        .bind(data.version)
        .bind(data.image_url)
        .bind(data.roles)
        .fetch_one(pool)
        .await
    }

    /// Lists the user's tools, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE user_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update, returning `None` if the user owns no such tool
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let set_image = data.image_url.is_some();

        sqlx::query_as::<_, Tool>(
            r#"
            UPDATE tools
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                rating = COALESCE($5, rating),
                version = COALESCE($6, version),
                image_url = CASE WHEN $7 THEN $8 ELSE image_url END,
                roles = COALESCE($9, roles),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.rating)
        .bind(data.version)
        .bind(set_image)
        .bind(data.image_url.flatten())
        .bind(data.roles)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a tool; its collection memberships cascade
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tools WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the ids in `ids` that do not name any tool at all
    pub async fn missing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT requested.id
            FROM UNNEST($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (SELECT 1 FROM tools t WHERE t.id = requested.id)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Filters `ids` down to tools owned by `user_id`
    pub async fn owned_ids(
        pool: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM tools WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
