/// The caller's own tools
///
/// Every lookup is scoped to the authenticated user, so another user's tool
/// answers 404 exactly like a missing one.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, Message},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use gauss_shared::{
    auth::context::AuthContext,
    models::tool::{CreateTool, Tool, UpdateTool},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct StoreToolRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "The description field is required"))]
    pub description: String,

    #[validate(range(min = 1, max = 5, message = "The rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 50, message = "The version must be between 1 and 50 characters"))]
    pub version: String,

    #[validate(length(max = 500, message = "The image url may not be greater than 500 characters"))]
    pub image_url: Option<String>,

    pub roles: Vec<String>,
}

/// Partial update; omitted fields are left alone, `image_url: null` clears
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateToolRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "The description may not be empty"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 5, message = "The rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(length(min = 1, max = 50, message = "The version must be between 1 and 50 characters"))]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500, message = "The image url may not be greater than 500 characters"))]
    pub image_url: Option<Option<String>>,

    pub roles: Option<Vec<String>>,
}

impl From<StoreToolRequest> for CreateTool {
    fn from(req: StoreToolRequest) -> Self {
        CreateTool {
            name: req.name,
            description: req.description,
            rating: req.rating,
            version: req.version,
            image_url: req.image_url,
            roles: req.roles,
        }
    }
}

impl From<UpdateToolRequest> for UpdateTool {
    fn from(req: UpdateToolRequest) -> Self {
        UpdateTool {
            name: req.name,
            description: req.description,
            rating: req.rating,
            version: req.version,
            image_url: req.image_url,
            roles: req.roles,
        }
    }
}

fn tool_not_found() -> ApiError {
    ApiError::NotFound("Tool not found".to_string())
}

pub async fn index(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Tool>>> {
    Ok(Json(Tool::list_for_user(&state.db, auth.user_id).await?))
}

pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StoreToolRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tool>)> {
    let Json(req) = payload?;
    req.validate()?;

    let tool = Tool::create(&state.db, auth.user_id, req.into()).await?;
    tracing::debug!(tool_id = %tool.id, user_id = %auth.user_id, "Tool created");

    Ok((StatusCode::CREATED, Json(tool)))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Tool>> {
    Tool::find_for_user(&state.db, id, auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(tool_not_found)
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateToolRequest>, JsonRejection>,
) -> ApiResult<Json<Tool>> {
    let Json(req) = payload?;
    req.validate()?;

    Tool::update(&state.db, id, auth.user_id, req.into())
        .await?
        .map(Json)
        .ok_or_else(tool_not_found)
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    if !Tool::delete(&state.db, id, auth.user_id).await? {
        return Err(tool_not_found());
    }

    Ok(Json(Message::new("Tool deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_rating_bounds() {
        let mut req: StoreToolRequest = serde_json::from_value(serde_json::json!({
            "name": "Vite",
            "description": "Build tool",
            "rating": 5,
            "version": "5.0",
            "roles": ["frontend"]
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        req.rating = 6;
        assert!(req.validate().unwrap_err().field_errors().contains_key("rating"));

        req.rating = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_partial_body() {
        let req: UpdateToolRequest =
            serde_json::from_str(r#"{"rating": 3, "image_url": null}"#).unwrap();
        assert!(req.validate().is_ok());

        let update: UpdateTool = req.into();
        assert_eq!(update.rating, Some(3));
        assert_eq!(update.image_url, Some(None));
        assert!(update.name.is_none());
        assert!(update.roles.is_none());
    }

    #[test]
    fn test_update_rejects_long_image_url() {
        let req = UpdateToolRequest {
            image_url: Some(Some("x".repeat(501))),
            ..Default::default()
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("image_url"));
    }
}
