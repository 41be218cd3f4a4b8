/// Curated discovery catalog
///
/// Explore tools are seeded, not owned by any user, and only read: by the
/// ranked listing and by the personalized suggestion sampler.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExploreTool {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub rating: i32,
    pub version: String,
    pub image_url: Option<String>,
    pub roles: Vec<String>,
    pub category: String,
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seed input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExploreTool {
    pub name: String,
    pub description: String,
    pub rating: i32,
    pub version: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub roles: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub popularity: i32,
}

impl ExploreTool {
    /// Every explore tool, most popular and best rated first
    pub async fn all_ranked(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTool>(
            "SELECT * FROM explore_tools ORDER BY popularity DESC, rating DESC, name",
        )
        .fetch_all(pool)
        .await
    }

    /// Up to `limit` random tools whose roles contain `role`
    pub async fn random_for_role(
        pool: &PgPool,
        role: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTool>(
            "SELECT * FROM explore_tools WHERE $1 = ANY(roles) ORDER BY random() LIMIT $2",
        )
        .bind(role)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Up to `limit` random tools not listed in `exclude`
    pub async fn random_excluding(
        pool: &PgPool,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTool>(
            "SELECT * FROM explore_tools WHERE NOT (id = ANY($1)) ORDER BY random() LIMIT $2",
        )
        .bind(exclude)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn exists_by_name<'e>(
        executor: impl PgExecutor<'e>,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM explore_tools WHERE name = $1)")
            .bind(name)
            .fetch_one(executor)
            .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        data: CreateExploreTool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ExploreTool>(
            r#"
            INSERT INTO explore_tools
                (name, description, rating, version, image_url, roles, category, popularity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.rating)
        .bind(data.version)
        .bind(data.image_url)
        .bind(data.roles)
        .bind(data.category)
        .bind(data.popularity)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_row_defaults() {
        let row: CreateExploreTool = serde_json::from_str(
            r#"{
                "name": "Postman",
                "description": "API platform",
                "rating": 5,
                "version": "10.0",
                "roles": ["backend", "qa"],
                "category": "api"
            }"#,
        )
        .unwrap();

        assert_eq!(row.popularity, 0);
        assert!(row.image_url.is_none());
        assert_eq!(row.roles, vec!["backend", "qa"]);
    }
}
