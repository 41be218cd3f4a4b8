/// Resource tags

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{require_slug, Message},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use gauss_shared::models::tag::{Tag, TagWithCount, TagWithResources};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct StoreTagRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
}

fn tag_not_found() -> ApiError {
    ApiError::NotFound("Tag not found".to_string())
}

pub async fn index(State(state): State<AppState>) -> ApiResult<Json<Vec<TagWithCount>>> {
    Ok(Json(Tag::list_with_counts(&state.db).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TagWithResources>> {
    let tag = Tag::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(tag_not_found)?;

    Ok(Json(tag.with_resources(&state.db).await?))
}

pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<StoreTagRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let Json(req) = payload?;
    req.validate()?;
    require_slug("name", &req.name)?;

    Ok((StatusCode::CREATED, Json(Tag::create(&state.db, &req.name).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTagRequest>, JsonRejection>,
) -> ApiResult<Json<Tag>> {
    let Json(req) = payload?;
    req.validate()?;
    if let Some(name) = &req.name {
        require_slug("name", name)?;
    }

    Tag::rename(&state.db, id, req.name)
        .await?
        .map(Json)
        .ok_or_else(tag_not_found)
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    if !Tag::delete(&state.db, id).await? {
        return Err(tag_not_found());
    }

    Ok(Json(Message::new("Tag deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        let req = StoreTagRequest {
            name: String::new(),
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("name"));

        let req: UpdateTagRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
    }
}
