/// Resource categories
///
/// Slugs are derived from the name and unique; a clash surfaces as a unique
/// violation on `categories_slug_key`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::resource::Resource;
use crate::slug::slugify;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,

    /// Icon name understood by the client
    pub icon: Option<String>,

    /// CSS color, e.g. `#3b82f6`
    pub color: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with the number of published resources filed under it
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub resources_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithResources {
    #[serde(flatten)]
    pub category: Category,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Partial update; a new name also re-derives the slug
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
}

impl Category {
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.*,
                   (SELECT COUNT(*)
                    FROM resource_category rc
                    JOIN resources r ON r.id = rc.resource_id
                    WHERE rc.category_id = c.id AND r.status = 'published') AS resources_count
            FROM categories c
            ORDER BY c.name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Published resources filed under this category, newest first
    pub async fn with_resources(self, pool: &PgPool) -> Result<CategoryWithResources, sqlx::Error> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT r.*
            FROM resources r
            JOIN resource_category rc ON rc.resource_id = r.id
            WHERE rc.category_id = $1 AND r.status = 'published'
            ORDER BY r.created_at DESC, r.id
            "#,
        )
        .bind(self.id)
        .fetch_all(pool)
        .await?;

        Ok(CategoryWithResources {
            category: self,
            resources,
        })
    }

    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, icon, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(slugify(&data.name))
        .bind(data.description)
        .bind(data.icon)
        .bind(data.color)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCategory,
    ) -> Result<Option<Self>, sqlx::Error> {
        let slug = data.name.as_deref().map(slugify);

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                icon = CASE WHEN $6 THEN $7 ELSE icon END,
                color = CASE WHEN $8 THEN $9 ELSE color END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(slug)
        .bind(data.description.is_some())
        .bind(data.description.flatten())
        .bind(data.icon.is_some())
        .bind(data.icon.flatten())
        .bind(data.color.is_some())
        .bind(data.color.flatten())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the ids in `ids` that name no category
    pub async fn missing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT requested.id
            FROM UNNEST($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (SELECT 1 FROM categories c WHERE c.id = requested.id)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
