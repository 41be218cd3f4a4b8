/// Resource categories
///
/// Listing and detail are public; `resources_count` and the detail
/// `resources` list include published resources only.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, require_slug, Message},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use gauss_shared::models::category::{
    Category, CategoryWithCount, CategoryWithResources, CreateCategory, UpdateCategory,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct StoreCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters"))]
    pub icon: Option<String>,

    #[validate(length(max = 20, message = "The color may not be greater than 20 characters"))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters"))]
    pub icon: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 20, message = "The color may not be greater than 20 characters"))]
    pub color: Option<Option<String>>,
}

fn category_not_found() -> ApiError {
    ApiError::NotFound("Category not found".to_string())
}

pub async fn index(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    Ok(Json(Category::list_with_counts(&state.db).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CategoryWithResources>> {
    let category = Category::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(category_not_found)?;

    Ok(Json(category.with_resources(&state.db).await?))
}

/// Creates a category; a name whose slug already exists answers 409
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<StoreCategoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(req) = payload?;
    req.validate()?;
    require_slug("name", &req.name)?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            name: req.name,
            description: req.description,
            icon: req.icon,
            color: req.color,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let Json(req) = payload?;
    req.validate()?;
    if let Some(name) = &req.name {
        require_slug("name", name)?;
    }

    Category::update(
        &state.db,
        id,
        UpdateCategory {
            name: req.name,
            description: req.description,
            icon: req.icon,
            color: req.color,
        },
    )
    .await?
    .map(Json)
    .ok_or_else(category_not_found)
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    if !Category::delete(&state.db, id).await? {
        return Err(category_not_found());
    }

    Ok(Json(Message::new("Category deleted successfully")))
}
