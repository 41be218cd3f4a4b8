/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(50) NOT NULL DEFAULT 'user',
///     bio VARCHAR(1000),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use gauss_shared::models::user::{CreateUser, User};
/// use gauss_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Frontend Developer".to_string(),
///         email: "frontend@gauss.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         role: "frontend".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "FRONTEND@gauss.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::collection::Collection;
use super::settings::UserSettings;

/// Role given to accounts that registered without naming one
pub const DEFAULT_ROLE: &str = "user";

/// User account
///
/// `password_hash` never leaves the server: it is skipped when serializing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique and case-insensitive (CITEXT)
    pub email: String,

    /// Argon2id PHC hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Free-text job function ("frontend", "devops", ...), drives explore suggestions
    pub role: String,

    /// Optional profile text
    pub bio: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,

    pub role: String,
}

/// Profile fields to change; `None` leaves a column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,

    /// `Some(None)` clears the bio
    pub bio: Option<Option<String>>,

    pub role: Option<String>,
}

impl User {
    /// Inserts a user row
    ///
    /// Accepts any executor so registration can run inside a transaction.
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` if the email is taken.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email::text AS email, password_hash, role, bio,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(executor)
        .await
    }

    /// Creates a user together with their settings row and default
    /// collections, all in one transaction
    pub async fn create_with_defaults(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = Self::create(&mut *tx, data).await?;
        UserSettings::create_default(&mut *tx, user.id).await?;
        Collection::create_defaults(&mut *tx, user.id).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Backfills settings and default collections for older accounts
    ///
    /// Default collections are only recreated when the user owns no
    /// collections at all.
    pub async fn ensure_defaults(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        UserSettings::create_default(pool, id).await?;

        if Collection::count_for_user(pool, id).await? == 0 {
            Collection::create_defaults(pool, id).await?;
        }

        Ok(())
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email::text AS email, password_hash, role, bio,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email, ignoring case
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email::text AS email, password_hash, role, bio,
                   created_at, updated_at
            FROM users
            WHERE email = $1::citext
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Whether `email` belongs to an account other than `except`
    ///
    /// Pass `None` to check against every account (registration).
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1::citext
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    /// Applies a partial profile update
    ///
    /// Returns `None` if the user no longer exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let clear_or_set_bio = data.bio.is_some();

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3::citext, email),
                bio = CASE WHEN $4 THEN $5 ELSE bio END,
                role = COALESCE($6, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email::text AS email, password_hash, role, bio,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(clear_or_set_bio)
        .bind(data.bio.flatten())
        .bind(data.role)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user; tools, collections, settings and tokens cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Role used to personalize explore suggestions
    ///
    /// Accounts still on the generic [`DEFAULT_ROLE`] are treated as frontend
    /// developers.
    pub fn suggestion_role(&self) -> &str {
        let role = self.role.trim();
        if role.is_empty() || role == DEFAULT_ROLE {
            "frontend"
        } else {
            role
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: role.to_string(),
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(user_with_role("backend")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "backend");
    }

    #[test]
    fn test_suggestion_role_falls_back_to_frontend() {
        assert_eq!(user_with_role("user").suggestion_role(), "frontend");
        assert_eq!(user_with_role("  ").suggestion_role(), "frontend");
        assert_eq!(user_with_role("devops").suggestion_role(), "devops");
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.bio.is_none());
        assert!(update.role.is_none());
    }
}
