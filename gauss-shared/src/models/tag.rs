/// Free-form resource tags
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::resource::Resource;
use crate::slug::slugify;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub tag: Tag,
    pub resources_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithResources {
    #[serde(flatten)]
    pub tag: Tag,
    pub resources: Vec<Resource>,
}

impl Tag {
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<TagWithCount>, sqlx::Error> {
        sqlx::query_as::<_, TagWithCount>(
            r#"
            SELECT t.*,
                   (SELECT COUNT(*)
                    FROM resource_tag rt
                    JOIN resources r ON r.id = rt.resource_id
                    WHERE rt.tag_id = t.id AND r.status = 'published') AS resources_count
            FROM tags t
            ORDER BY t.name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn with_resources(self, pool: &PgPool) -> Result<TagWithResources, sqlx::Error> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT r.*
            FROM resources r
            JOIN resource_tag rt ON rt.resource_id = r.id
            WHERE rt.tag_id = $1 AND r.status = 'published'
            ORDER BY r.created_at DESC, r.id
            "#,
        )
        .bind(self.id)
        .fetch_all(pool)
        .await?;

        Ok(TagWithResources {
            tag: self,
            resources,
        })
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(slugify(name))
        .fetch_one(pool)
        .await
    }

    /// Renames a tag, re-deriving its slug; `None` only bumps `updated_at`
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let slug = name.as_deref().map(slugify);

        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn missing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT requested.id
            FROM UNNEST($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (SELECT 1 FROM tags t WHERE t.id = requested.id)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
