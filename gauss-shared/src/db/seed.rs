/// Catalog and demo-account seeding
///
/// Seed data ships inside the binary (`seeds/*.json` at the workspace root).
/// Every step skips rows that already exist, matched by slug, email or name,
/// so seeding can be re-run against a live database.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::category::{Category, CreateCategory};
use crate::models::explore_tool::{CreateExploreTool, ExploreTool};
use crate::models::resource::{CreateResource, Resource, ResourceStatus, ResourceType};
use crate::models::tag::Tag;
use crate::models::user::{CreateUser, User};
use crate::slug::slugify;

const EXPLORE_TOOLS_JSON: &str = include_str!("../../../seeds/explore_tools.json");
const CATALOG_JSON: &str = include_str!("../../../seeds/catalog.json");

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid seed data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("failed to hash seed password: {0}")]
    Password(#[from] PasswordError),

    #[error("resource owner '{0}' was not seeded")]
    MissingOwner(String),

    #[error("resource '{resource}' references unknown {kind} '{slug}'")]
    UnknownReference {
        resource: String,
        kind: &'static str,
        slug: String,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogSeed {
    categories: Vec<CategorySeed>,
    tags: Vec<String>,
    users: Vec<UserSeed>,
    resources: Vec<ResourceSeed>,

    /// Email of the account that authors every seeded resource
    resource_owner: String,
}

#[derive(Debug, Deserialize)]
struct CategorySeed {
    name: String,
    description: Option<String>,
    icon: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserSeed {
    name: String,
    email: String,
    password: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct ResourceSeed {
    title: String,
    description: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    url: Option<String>,
    repository_url: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Rows inserted by a seeding run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub tags: usize,
    pub explore_tools: usize,
    pub users: usize,
    pub resources: usize,
}

/// Seeds everything: catalog, explore tools, demo users and resources
pub async fn seed_all(pool: &PgPool) -> Result<SeedReport, SeedError> {
    let catalog: CatalogSeed = serde_json::from_str(CATALOG_JSON)?;
    let mut report = SeedReport::default();

    report.categories = seed_categories(pool, catalog.categories).await?;
    report.tags = seed_tags(pool, &catalog.tags).await?;
    report.explore_tools = seed_explore_tools(pool).await?;
    report.users = seed_users(pool, catalog.users).await?;
    report.resources = seed_resources(pool, &catalog.resource_owner, catalog.resources).await?;

    info!(
        categories = report.categories,
        tags = report.tags,
        explore_tools = report.explore_tools,
        users = report.users,
        resources = report.resources,
        "Seeding finished"
    );

    Ok(report)
}

async fn seed_categories(pool: &PgPool, categories: Vec<CategorySeed>) -> Result<usize, SeedError> {
    let mut inserted = 0;

    for seed in categories {
        if Category::find_by_slug(pool, &slugify(&seed.name)).await?.is_some() {
            debug!(name = %seed.name, "Category exists, skipping");
            continue;
        }

        Category::create(
            pool,
            CreateCategory {
                name: seed.name,
                description: seed.description,
                icon: seed.icon,
                color: seed.color,
            },
        )
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

async fn seed_tags(pool: &PgPool, tags: &[String]) -> Result<usize, SeedError> {
    let mut inserted = 0;

    for name in tags {
        if Tag::find_by_slug(pool, &slugify(name)).await?.is_some() {
            continue;
        }
        Tag::create(pool, name).await?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Seeds the explore catalog; exposed separately for test fixtures
pub async fn seed_explore_tools(pool: &PgPool) -> Result<usize, SeedError> {
    let tools: Vec<CreateExploreTool> = serde_json::from_str(EXPLORE_TOOLS_JSON)?;
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for tool in tools {
        if ExploreTool::exists_by_name(&mut *tx, &tool.name).await? {
            continue;
        }
        ExploreTool::create(&mut *tx, tool).await?;
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn seed_users(pool: &PgPool, users: Vec<UserSeed>) -> Result<usize, SeedError> {
    let mut inserted = 0;

    for seed in users {
        if let Some(existing) = User::find_by_email(pool, &seed.email).await? {
            User::ensure_defaults(pool, existing.id).await?;
            continue;
        }

        let password_hash = hash_password(&seed.password)?;
        User::create_with_defaults(
            pool,
            CreateUser {
                name: seed.name,
                email: seed.email,
                password_hash,
                role: seed.role,
            },
        )
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

async fn seed_resources(
    pool: &PgPool,
    owner_email: &str,
    resources: Vec<ResourceSeed>,
) -> Result<usize, SeedError> {
    let owner = User::find_by_email(pool, owner_email)
        .await?
        .ok_or_else(|| SeedError::MissingOwner(owner_email.to_string()))?;
    let mut inserted = 0;

    for seed in resources {
        if Resource::find_by_slug(pool, &slugify(&seed.title)).await?.is_some() {
            continue;
        }

        let mut category_ids = Vec::with_capacity(seed.categories.len());
        for slug in &seed.categories {
            let category = Category::find_by_slug(pool, slug).await?.ok_or_else(|| {
                SeedError::UnknownReference {
                    resource: seed.title.clone(),
                    kind: "category",
                    slug: slug.clone(),
                }
            })?;
            category_ids.push(category.id);
        }

        let tag_ids = resolve_tags(pool, &seed.title, &seed.tags).await?;

        Resource::create(
            pool,
            owner.id,
            CreateResource {
                title: seed.title,
                description: seed.description,
                resource_type: seed.resource_type,
                url: seed.url,
                repository_url: seed.repository_url,
                image_url: None,
                status: ResourceStatus::Published,
                categories: Some(category_ids),
                tags: Some(tag_ids),
            },
        )
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Tags referenced by a resource but missing from the tag list are skipped
async fn resolve_tags(pool: &PgPool, title: &str, slugs: &[String]) -> Result<Vec<Uuid>, SeedError> {
    let mut ids = Vec::with_capacity(slugs.len());

    for slug in slugs {
        match Tag::find_by_slug(pool, slug).await? {
            Some(tag) => ids.push(tag.id),
            None => warn!(resource = %title, tag = %slug, "Unknown tag in seed data"),
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_seed_parses() {
        let catalog: CatalogSeed = serde_json::from_str(CATALOG_JSON).unwrap();

        assert_eq!(catalog.categories.len(), 6);
        assert!(catalog.users.iter().any(|u| u.email == catalog.resource_owner));
        assert!(catalog.users.iter().all(|u| u.password.len() >= 6));
    }

    #[test]
    fn test_seed_resources_reference_seeded_slugs() {
        let catalog: CatalogSeed = serde_json::from_str(CATALOG_JSON).unwrap();
        let category_slugs: Vec<String> =
            catalog.categories.iter().map(|c| slugify(&c.name)).collect();

        for resource in &catalog.resources {
            for slug in &resource.categories {
                assert!(category_slugs.contains(slug), "unknown category {slug}");
            }
        }
    }

    #[test]
    fn test_explore_tools_seed_parses() {
        let tools: Vec<CreateExploreTool> = serde_json::from_str(EXPLORE_TOOLS_JSON).unwrap();

        assert!(tools.len() >= 100);
        assert!(tools.iter().all(|t| (1..=5).contains(&t.rating)));
        assert!(tools.iter().all(|t| !t.roles.is_empty()));
    }
}
