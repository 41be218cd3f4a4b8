/// Public catalog resources
///
/// Resources are authored by a user, filed under categories and tags, and
/// only visible in public listings once `status = 'published'`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE resources (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT NOT NULL,
///     type VARCHAR(20) NOT NULL DEFAULT 'tool',
///     url VARCHAR(2048),
///     repository_url VARCHAR(2048),
///     image_url VARCHAR(2048),
///     status VARCHAR(20) NOT NULL DEFAULT 'draft',
///     ...
/// );
/// ```
///
/// Link tables `resource_category` and `resource_tag` are replaced wholesale
/// (synced) whenever a write supplies the corresponding id list.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::category::Category;
use super::page::{offset, Page};
use super::tag::Tag;
use crate::slug::slugify;

/// Public listing page size
pub const PER_PAGE: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Tool,
    Library,
    App,
    Documentation,
    Article,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Tool => "tool",
            ResourceType::Library => "library",
            ResourceType::App => "app",
            ResourceType::Documentation => "documentation",
            ResourceType::Article => "article",
            ResourceType::Other => "other",
        }
    }
}

impl FromStr for ResourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool" => Ok(ResourceType::Tool),
            "library" => Ok(ResourceType::Library),
            "app" => Ok(ResourceType::App),
            "documentation" => Ok(ResourceType::Documentation),
            "article" => Ok(ResourceType::Article),
            "other" => Ok(ResourceType::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Draft => "draft",
            ResourceStatus::Published => "published",
            ResourceStatus::Archived => "archived",
        }
    }
}

impl FromStr for ResourceStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ResourceStatus::Draft),
            "published" => Ok(ResourceStatus::Published),
            "archived" => Ok(ResourceStatus::Archived),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Returned when parsing a type or status string that is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub resource_type: String,

    pub url: Option<String>,
    pub repository_url: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a resource's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

/// Resource with author, categories and tags loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDetail {
    #[serde(flatten)]
    pub resource: Resource,
    pub user: Option<Author>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Filters for the public listing; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFilter {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    /// Category slug
    pub category: Option<String>,

    /// Tag slug
    pub tag: Option<String>,

    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateResource {
    pub title: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub url: Option<String>,
    pub repository_url: Option<String>,
    pub image_url: Option<String>,
    pub status: ResourceStatus,
    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
}

/// Partial update; link lists, when present, replace the current links
#[derive(Debug, Clone, Default)]
pub struct UpdateResource {
    pub title: Option<String>,
    pub description: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub url: Option<Option<String>>,
    pub repository_url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub status: Option<ResourceStatus>,
    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
}

#[derive(sqlx::FromRow)]
struct CategoryLink {
    resource_id: Uuid,
    #[sqlx(flatten)]
    category: Category,
}

#[derive(sqlx::FromRow)]
struct TagLink {
    resource_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Escapes LIKE wildcards so the search term matches literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_published_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ResourceFilter) {
    qb.push(" WHERE r.status = 'published'");

    if let Some(resource_type) = &filter.resource_type {
        qb.push(" AND r.type = ").push_bind(resource_type.clone());
    }

    if let Some(category) = &filter.category {
        qb.push(
            " AND EXISTS (SELECT 1 FROM resource_category rc \
             JOIN categories c ON c.id = rc.category_id \
             WHERE rc.resource_id = r.id AND c.slug = ",
        )
        .push_bind(category.clone())
        .push(")");
    }

    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM resource_tag rt \
             JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.resource_id = r.id AND t.slug = ",
        )
        .push_bind(tag.clone())
        .push(")");
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (r.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl Resource {
    /// One page of published resources, newest first
    pub async fn list_published(
        pool: &PgPool,
        filter: &ResourceFilter,
        page: i64,
    ) -> Result<Page<ResourceDetail>, sqlx::Error> {
        let page = page.max(1);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM resources r");
        push_published_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT r.* FROM resources r");
        push_published_filters(&mut select, filter);
        select
            .push(" ORDER BY r.created_at DESC, r.id LIMIT ")
            .push_bind(PER_PAGE)
            .push(" OFFSET ")
            .push_bind(offset(page, PER_PAGE));
        let rows: Vec<Resource> = select.build_query_as().fetch_all(pool).await?;

        let data = Self::load_details(pool, rows).await?;
        Ok(Page::new(data, page, PER_PAGE, total))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Loads author, categories and tags for this resource
    pub async fn into_detail(self, pool: &PgPool) -> Result<ResourceDetail, sqlx::Error> {
        let mut details = Self::load_details(pool, vec![self]).await?;
        details
            .pop()
            .ok_or_else(|| sqlx::Error::Protocol("resource detail missing".into()))
    }

    async fn load_details(
        pool: &PgPool,
        resources: Vec<Resource>,
    ) -> Result<Vec<ResourceDetail>, sqlx::Error> {
        if resources.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = resources.iter().map(|r| r.id).collect();
        let user_ids: Vec<Uuid> = resources.iter().map(|r| r.user_id).collect();

        let authors: HashMap<Uuid, Author> =
            sqlx::query_as::<_, Author>("SELECT id, name FROM users WHERE id = ANY($1)")
                .bind(&user_ids)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect();

        let mut categories: HashMap<Uuid, Vec<Category>> = HashMap::new();
        let category_links = sqlx::query_as::<_, CategoryLink>(
            r#"
            SELECT rc.resource_id, c.*
            FROM resource_category rc
            JOIN categories c ON c.id = rc.category_id
            WHERE rc.resource_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for link in category_links {
            categories.entry(link.resource_id).or_default().push(link.category);
        }

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        let tag_links = sqlx::query_as::<_, TagLink>(
            r#"
            SELECT rt.resource_id, t.*
            FROM resource_tag rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.resource_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for link in tag_links {
            tags.entry(link.resource_id).or_default().push(link.tag);
        }

        Ok(resources
            .into_iter()
            .map(|resource| ResourceDetail {
                user: authors.get(&resource.user_id).cloned(),
                categories: categories.remove(&resource.id).unwrap_or_default(),
                tags: tags.remove(&resource.id).unwrap_or_default(),
                resource,
            })
            .collect())
    }

    /// Inserts a resource and its links in one transaction
    ///
    /// # Errors
    ///
    /// A title whose slug is already taken fails with a unique violation on
    /// `resources_slug_key`.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateResource,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources
                (user_id, title, slug, description, type, url, repository_url, image_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&data.title)
        .bind(slugify(&data.title))
        .bind(data.description)
        .bind(data.resource_type.as_str())
        .bind(data.url)
        .bind(data.repository_url)
        .bind(data.image_url)
        .bind(data.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(category_ids) = &data.categories {
            sync_categories(&mut tx, resource.id, category_ids).await?;
        }
        if let Some(tag_ids) = &data.tags {
            sync_tags(&mut tx, resource.id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(resource)
    }

    /// Applies a partial update and syncs any supplied links
    ///
    /// Returns `None` if the resource no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateResource,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let slug = data.title.as_deref().map(slugify);

        let resource = sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                type = COALESCE($5, type),
                url = CASE WHEN $6 THEN $7 ELSE url END,
                repository_url = CASE WHEN $8 THEN $9 ELSE repository_url END,
                image_url = CASE WHEN $10 THEN $11 ELSE image_url END,
                status = COALESCE($12, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(slug)
        .bind(data.description)
        .bind(data.resource_type.map(|t| t.as_str()))
        .bind(data.url.is_some())
        .bind(data.url.flatten())
        .bind(data.repository_url.is_some())
        .bind(data.repository_url.flatten())
        .bind(data.image_url.is_some())
        .bind(data.image_url.flatten())
        .bind(data.status.map(|s| s.as_str()))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(resource) = resource else {
            return Ok(None);
        };

        if let Some(category_ids) = &data.categories {
            sync_categories(&mut tx, resource.id, category_ids).await?;
        }
        if let Some(tag_ids) = &data.tags {
            sync_tags(&mut tx, resource.id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(resource))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Replaces the resource's category links with `category_ids`
async fn sync_categories(
    conn: &mut PgConnection,
    resource_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resource_category WHERE resource_id = $1")
        .bind(resource_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO resource_category (resource_id, category_id)
        SELECT $1, category_id FROM UNNEST($2::uuid[]) AS link(category_id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(resource_id)
    .bind(category_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Replaces the resource's tag links with `tag_ids`
async fn sync_tags(
    conn: &mut PgConnection,
    resource_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resource_tag WHERE resource_id = $1")
        .bind(resource_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO resource_tag (resource_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS link(tag_id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(resource_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
