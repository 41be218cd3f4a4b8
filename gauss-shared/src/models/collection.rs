/// Named, user-owned groups of tools
///
/// Each user owns the two default collections ([`DEFAULT_COLLECTIONS`]),
/// which cannot be deleted. Membership lives in `collection_tool`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE collections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     is_default BOOLEAN NOT NULL DEFAULT FALSE,
///     ...
/// );
///
/// CREATE TABLE collection_tool (
///     collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
///     tool_id UUID NOT NULL REFERENCES tools(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (collection_id, tool_id)
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::tool::Tool;

/// Collections every account starts with
pub const DEFAULT_COLLECTIONS: [&str; 2] = ["All", "Favourites"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection with its member tools loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionWithTools {
    #[serde(flatten)]
    pub collection: Collection,
    pub tools: Vec<Tool>,
    pub tools_count: usize,
}

impl CollectionWithTools {
    pub fn new(collection: Collection, tools: Vec<Tool>) -> Self {
        Self {
            tools_count: tools.len(),
            collection,
            tools,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    collection_id: Uuid,
    #[sqlx(flatten)]
    tool: Tool,
}

impl Collection {
    /// Creates the default collections for a user
    pub async fn create_defaults<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO collections (user_id, name, is_default)
            SELECT $1, name, TRUE FROM UNNEST($2::text[]) AS defaults(name)
            "#,
        )
        .bind(user_id)
        .bind(&DEFAULT_COLLECTIONS[..])
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM collections WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Creates a user collection (never a default one)
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Collection>(
            r#"
            INSERT INTO collections (user_id, name, is_default)
            VALUES ($1, $2, FALSE)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Creates a user collection and its first members in one transaction
    pub async fn create_with_tools(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
        tool_ids: &[Uuid],
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let collection = Self::create(&mut *tx, user_id, name).await?;
        Self::attach_tools(&mut *tx, collection.id, tool_ids).await?;

        tx.commit().await?;
        Ok(collection)
    }

    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the user's collections, newest first, with their tools
    pub async fn list_with_tools(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<CollectionWithTools>, sqlx::Error> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE user_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let ids: Vec<Uuid> = collections.iter().map(|c| c.id).collect();
        let mut members = Self::load_members(pool, &ids).await?;

        Ok(collections
            .into_iter()
            .map(|collection| {
                let tools = members.remove(&collection.id).unwrap_or_default();
                CollectionWithTools::new(collection, tools)
            })
            .collect())
    }

    /// Loads the member tools of a single collection
    pub async fn with_tools(self, pool: &PgPool) -> Result<CollectionWithTools, sqlx::Error> {
        let mut members = Self::load_members(pool, &[self.id]).await?;
        let tools = members.remove(&self.id).unwrap_or_default();
        Ok(CollectionWithTools::new(self, tools))
    }

    async fn load_members(
        pool: &PgPool,
        collection_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Tool>>, sqlx::Error> {
        if collection_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT ct.collection_id, t.*
            FROM collection_tool ct
            JOIN tools t ON t.id = ct.tool_id
            WHERE ct.collection_id = ANY($1)
            ORDER BY ct.created_at, t.id
            "#,
        )
        .bind(collection_ids)
        .fetch_all(pool)
        .await?;

        let mut members: HashMap<Uuid, Vec<Tool>> = HashMap::new();
        for row in rows {
            members.entry(row.collection_id).or_default().push(row.tool);
        }

        Ok(members)
    }

    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Collection>(
            r#"
            UPDATE collections
            SET name = COALESCE($3, name),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a non-default collection
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM collections WHERE id = $1 AND user_id = $2 AND NOT is_default",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds tools to the collection, skipping ones already present
    pub async fn attach_tools<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        tool_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if tool_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO collection_tool (collection_id, tool_id)
            SELECT $1, tool_id FROM UNNEST($2::uuid[]) AS attach(tool_id)
            ON CONFLICT (collection_id, tool_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(tool_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn detach_tool(pool: &PgPool, id: Uuid, tool_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM collection_tool WHERE collection_id = $1 AND tool_id = $2",
        )
        .bind(id)
        .bind(tool_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str, is_default: bool) -> Collection {
        Collection {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            is_default,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_collection_names() {
        assert_eq!(DEFAULT_COLLECTIONS, ["All", "Favourites"]);
    }

    #[test]
    fn test_collection_with_tools_flattens() {
        let loaded = CollectionWithTools::new(collection("Frontend", false), Vec::new());
        let json = serde_json::to_value(&loaded).unwrap();

        assert_eq!(json["name"], "Frontend");
        assert_eq!(json["is_default"], false);
        assert_eq!(json["tools_count"], 0);
        assert!(json["tools"].as_array().unwrap().is_empty());
    }
}
