/// Public resource catalog
///
/// Reads are public. Listings show published resources only, while `show`
/// by slug returns any status. Only the author may update or delete.

use std::str::FromStr;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, require_slug, Message},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use gauss_shared::{
    auth::context::AuthContext,
    models::{
        category::Category,
        page::Page,
        resource::{
            CreateResource, Resource, ResourceDetail, ResourceFilter, ResourceStatus,
            ResourceType, UpdateResource,
        },
        tag::Tag,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Query string for `GET /api/resources`
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub page: Option<i64>,

    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl ResourceQuery {
    fn filter(&self) -> ResourceFilter {
        ResourceFilter {
            resource_type: self.resource_type.clone(),
            category: self.category.clone(),
            tag: self.tag.clone(),
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreResourceRequest {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "The description field is required"))]
    pub description: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[validate(url(message = "The url must be a valid URL"))]
    pub url: Option<String>,

    #[validate(url(message = "The repository url must be a valid URL"))]
    pub repository_url: Option<String>,

    #[validate(url(message = "The image url must be a valid URL"))]
    pub image_url: Option<String>,

    pub status: Option<String>,

    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
}

/// Partial update; `null` clears a URL, a present array replaces the links
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "The description may not be empty"))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(url(message = "The url must be a valid URL"))]
    pub url: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(url(message = "The repository url must be a valid URL"))]
    pub repository_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(url(message = "The image url must be a valid URL"))]
    pub image_url: Option<Option<String>>,

    pub status: Option<String>,

    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
}

fn parse_type(value: &str) -> ApiResult<ResourceType> {
    ResourceType::from_str(value).map_err(|_| {
        ApiError::field(
            "type",
            "The type must be one of tool, library, app, documentation, article, other",
        )
    })
}

fn parse_status(value: &str) -> ApiResult<ResourceStatus> {
    ResourceStatus::from_str(value).map_err(|_| {
        ApiError::field("status", "The status must be one of draft, published, archived")
    })
}

/// Rejects the request if any category or tag id is unknown
async fn check_links(
    state: &AppState,
    categories: Option<&[Uuid]>,
    tags: Option<&[Uuid]>,
) -> ApiResult<()> {
    if let Some(ids) = categories.filter(|ids| !ids.is_empty()) {
        if let Some(missing) = Category::missing_ids(&state.db, ids).await?.first() {
            return Err(ApiError::field(
                "categories",
                format!("The selected category id {} is invalid", missing),
            ));
        }
    }

    if let Some(ids) = tags.filter(|ids| !ids.is_empty()) {
        if let Some(missing) = Tag::missing_ids(&state.db, ids).await?.first() {
            return Err(ApiError::field(
                "tags",
                format!("The selected tag id {} is invalid", missing),
            ));
        }
    }

    Ok(())
}

/// Loads a resource the caller authored
///
/// # Errors
///
/// - `404`: no such resource
/// - `403`: someone else authored it
async fn authored_resource(state: &AppState, id: Uuid, user_id: Uuid) -> ApiResult<Resource> {
    let resource = Resource::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    if resource.user_id != user_id {
        return Err(ApiError::Forbidden(
            "You do not own this resource".to_string(),
        ));
    }

    Ok(resource)
}

/// Lists published resources, 12 per page
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Json<Page<ResourceDetail>>> {
    let page = query.page.unwrap_or(1);
    Ok(Json(
        Resource::list_published(&state.db, &query.filter(), page).await?,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ResourceDetail>> {
    let resource = Resource::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(resource.into_detail(&state.db).await?))
}

/// Creates a resource authored by the caller
///
/// # Errors
///
/// - `422`: validation failed, the title has no letters or digits, or a
///   category/tag id is unknown
/// - `409`: the title's slug is already taken
pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StoreResourceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ResourceDetail>)> {
    let Json(req) = payload?;
    req.validate()?;
    require_slug("title", &req.title)?;

    let resource_type = parse_type(&req.resource_type)?;
    let status = req
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or_default();

    check_links(&state, req.categories.as_deref(), req.tags.as_deref()).await?;

    let resource = Resource::create(
        &state.db,
        auth.user_id,
        CreateResource {
            title: req.title,
            description: req.description,
            resource_type,
            url: req.url,
            repository_url: req.repository_url,
            image_url: req.image_url,
            status,
            categories: req.categories,
            tags: req.tags,
        },
    )
    .await?;

    tracing::info!(resource_id = %resource.id, slug = %resource.slug, "Resource created");

    Ok((
        StatusCode::CREATED,
        Json(resource.into_detail(&state.db).await?),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateResourceRequest>, JsonRejection>,
) -> ApiResult<Json<ResourceDetail>> {
    let Json(req) = payload?;
    req.validate()?;
    if let Some(title) = &req.title {
        require_slug("title", title)?;
    }

    let resource_type = req.resource_type.as_deref().map(parse_type).transpose()?;
    let status = req.status.as_deref().map(parse_status).transpose()?;

    let resource = authored_resource(&state, id, auth.user_id).await?;
    check_links(&state, req.categories.as_deref(), req.tags.as_deref()).await?;

    let updated = Resource::update(
        &state.db,
        resource.id,
        UpdateResource {
            title: req.title,
            description: req.description,
            resource_type,
            url: req.url,
            repository_url: req.repository_url,
            image_url: req.image_url,
            status,
            categories: req.categories,
            tags: req.tags,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(updated.into_detail(&state.db).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    let resource = authored_resource(&state, id, auth.user_id).await?;
    Resource::delete(&state.db, resource.id).await?;

    Ok(Json(Message::new("Resource deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_and_status_parsing() {
        assert_eq!(parse_type("library").unwrap(), ResourceType::Library);
        assert!(matches!(
            parse_type("podcast"),
            Err(ApiError::ValidationError(ref d)) if d[0].field == "type"
        ));

        assert_eq!(parse_status("published").unwrap(), ResourceStatus::Published);
        assert!(parse_status("deleted").is_err());
    }

    #[test]
    fn test_store_rejects_invalid_url() {
        let req: StoreResourceRequest = serde_json::from_value(serde_json::json!({
            "title": "Axum",
            "description": "Web framework",
            "type": "library",
            "url": "not a url"
        }))
        .unwrap();

        assert!(req.validate().unwrap_err().field_errors().contains_key("url"));
    }

    #[test]
    fn test_query_builds_filter() {
        let query: ResourceQuery =
            serde_json::from_str(r#"{"page": 2, "type": "tool", "search": "rust"}"#).unwrap();
        let filter = query.filter();

        assert_eq!(query.page, Some(2));
        assert_eq!(filter.resource_type.as_deref(), Some("tool"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert!(filter.category.is_none());
    }
}
