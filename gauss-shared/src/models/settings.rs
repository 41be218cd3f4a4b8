/// Per-user display, notification and privacy preferences
///
/// One row per user (`user_id` is unique). Rows are created with column
/// defaults at registration, and lazily by [`UserSettings::get_or_create`]
/// for accounts that predate them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_settings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     view_mode VARCHAR(20) NOT NULL DEFAULT 'comfortable',
///     cards_per_page INTEGER NOT NULL DEFAULT 12,
///     default_collection VARCHAR(255) NOT NULL DEFAULT 'All',
///     email_notifications BOOLEAN NOT NULL DEFAULT TRUE,
///     tool_updates BOOLEAN NOT NULL DEFAULT TRUE,
///     workshop_reminders BOOLEAN NOT NULL DEFAULT FALSE,
///     weekly_digest BOOLEAN NOT NULL DEFAULT TRUE,
///     public_collections BOOLEAN NOT NULL DEFAULT FALSE,
///     public_profile BOOLEAN NOT NULL DEFAULT TRUE,
///     share_tool_history BOOLEAN NOT NULL DEFAULT FALSE,
///     ...
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Accepted `view_mode` values
pub const VIEW_MODES: [&str; 3] = ["compact", "comfortable", "spacious"];

/// Accepted `cards_per_page` values
pub const CARDS_PER_PAGE: [i32; 4] = [6, 12, 24, 48];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub view_mode: String,
    pub cards_per_page: i32,
    pub default_collection: String,
    pub email_notifications: bool,
    pub tool_updates: bool,
    pub workshop_reminders: bool,
    pub weekly_digest: bool,
    pub public_collections: bool,
    pub public_profile: bool,
    pub share_tool_history: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial settings update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    pub view_mode: Option<String>,
    pub cards_per_page: Option<i32>,
    pub default_collection: Option<String>,
    pub email_notifications: Option<bool>,
    pub tool_updates: Option<bool>,
    pub workshop_reminders: Option<bool>,
    pub weekly_digest: Option<bool>,
    pub public_collections: Option<bool>,
    pub public_profile: Option<bool>,
    pub share_tool_history: Option<bool>,
}

impl UserSettings {
    /// Inserts the default row for a user unless one exists
    pub async fn create_default<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserSettings>("SELECT * FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Returns the user's settings, creating the default row first if needed
    pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        Self::create_default(pool, user_id).await?;

        sqlx::query_as::<_, UserSettings>("SELECT * FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Applies a partial update, creating the row if it is missing
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        data: UpdateSettings,
    ) -> Result<Self, sqlx::Error> {
        Self::create_default(pool, user_id).await?;

        sqlx::query_as::<_, UserSettings>(
            r#"
            UPDATE user_settings
            SET view_mode = COALESCE($2, view_mode),
                cards_per_page = COALESCE($3, cards_per_page),
                default_collection = COALESCE($4, default_collection),
                email_notifications = COALESCE($5, email_notifications),
                tool_updates = COALESCE($6, tool_updates),
                workshop_reminders = COALESCE($7, workshop_reminders),
                weekly_digest = COALESCE($8, weekly_digest),
                public_collections = COALESCE($9, public_collections),
                public_profile = COALESCE($10, public_profile),
                share_tool_history = COALESCE($11, share_tool_history),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(data.view_mode)
        .bind(data.cards_per_page)
        .bind(data.default_collection)
        .bind(data.email_notifications)
        .bind(data.tool_updates)
        .bind(data.workshop_reminders)
        .bind(data.weekly_digest)
        .bind(data.public_collections)
        .bind(data.public_profile)
        .bind(data.share_tool_history)
        .fetch_one(pool)
        .await
    }
}
