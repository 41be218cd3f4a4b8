/// Database models for Gauss
///
/// One module per table (or table group) with its row struct and the SQL
/// that reads and writes it.
///
/// # Models
///
/// - `user`: accounts and profile fields
/// - `access_token`: issued bearer tokens, deleted on logout
/// - `settings`: per-user display and notification preferences
/// - `tool`: user-owned developer tools
/// - `collection`: named groups of a user's tools
/// - `explore_tool`: curated discovery catalog
/// - `resource`, `category`, `tag`: the public resource catalog
/// - `page`: pagination envelope for listings
///
/// # Example
///
/// ```no_run
/// use gauss_shared::models::tool::{CreateTool, Tool};
/// use gauss_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let tool = Tool::create(
///     &pool,
///     user_id,
///     CreateTool {
///         name: "Docker Desktop".to_string(),
///         description: "Containers on your laptop".to_string(),
///         rating: 5,
///         version: "4.25".to_string(),
///         image_url: None,
///         roles: vec!["devops".to_string(), "backend".to_string()],
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod access_token;
pub mod category;
pub mod collection;
pub mod explore_tool;
pub mod page;
pub mod resource;
pub mod settings;
pub mod tag;
pub mod tool;
pub mod user;
