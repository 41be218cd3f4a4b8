/// The caller's tool collections
///
/// Default collections ("All", "Favourites") can be renamed and filled but
/// never deleted. Tool ids sent by the client must name existing tools; ids
/// of tools owned by someone else are dropped without error.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Message,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use gauss_shared::{
    auth::context::AuthContext,
    models::{
        collection::{Collection, CollectionWithTools},
        tool::Tool,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct StoreCollectionRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,

    #[serde(default)]
    pub tool_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCollectionRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToolsRequest {
    #[validate(length(min = 1, message = "The tool ids field is required"))]
    pub tool_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AddToolsResponse {
    pub message: &'static str,
    pub collection: CollectionWithTools,
}

fn collection_not_found() -> ApiError {
    ApiError::NotFound("Collection not found".to_string())
}

/// Checks every id names a tool, then keeps only the caller's own
async fn attachable_tool_ids(
    state: &AppState,
    user_id: Uuid,
    tool_ids: &[Uuid],
) -> ApiResult<Vec<Uuid>> {
    if tool_ids.is_empty() {
        return Ok(Vec::new());
    }

    let missing = Tool::missing_ids(&state.db, tool_ids).await?;
    if let Some(first) = missing.first() {
        return Err(ApiError::field(
            "tool_ids",
            format!("The selected tool id {} is invalid", first),
        ));
    }

    Ok(Tool::owned_ids(&state.db, user_id, tool_ids).await?)
}

async fn owned_collection(state: &AppState, id: Uuid, user_id: Uuid) -> ApiResult<Collection> {
    Collection::find_for_user(&state.db, id, user_id)
        .await?
        .ok_or_else(collection_not_found)
}

pub async fn index(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CollectionWithTools>>> {
    Ok(Json(Collection::list_with_tools(&state.db, auth.user_id).await?))
}

pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StoreCollectionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CollectionWithTools>)> {
    let Json(req) = payload?;
    req.validate()?;

    let tool_ids = attachable_tool_ids(&state, auth.user_id, &req.tool_ids).await?;

    let collection =
        Collection::create_with_tools(&state.db, auth.user_id, &req.name, &tool_ids).await?;

    Ok((StatusCode::CREATED, Json(collection.with_tools(&state.db).await?)))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CollectionWithTools>> {
    let collection = owned_collection(&state, id, auth.user_id).await?;
    Ok(Json(collection.with_tools(&state.db).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCollectionRequest>, JsonRejection>,
) -> ApiResult<Json<CollectionWithTools>> {
    let Json(req) = payload?;
    req.validate()?;

    let collection = Collection::rename(&state.db, id, auth.user_id, req.name)
        .await?
        .ok_or_else(collection_not_found)?;

    Ok(Json(collection.with_tools(&state.db).await?))
}

/// Deletes a user-created collection
///
/// # Errors
///
/// - `403`: the collection is a default one
/// - `404`: not the caller's collection
pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    let collection = owned_collection(&state, id, auth.user_id).await?;

    if collection.is_default {
        return Err(ApiError::Forbidden(
            "Cannot delete default collections".to_string(),
        ));
    }

    Collection::delete(&state.db, collection.id, auth.user_id).await?;
    Ok(Json(Message::new("Collection deleted successfully")))
}

pub async fn add_tools(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AddToolsRequest>, JsonRejection>,
) -> ApiResult<Json<AddToolsResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let collection = owned_collection(&state, id, auth.user_id).await?;
    let tool_ids = attachable_tool_ids(&state, auth.user_id, &req.tool_ids).await?;

    let added = Collection::attach_tools(&state.db, collection.id, &tool_ids).await?;
    tracing::debug!(collection_id = %collection.id, added, "Tools attached");

    Ok(Json(AddToolsResponse {
        message: "Tools added to collection",
        collection: collection.with_tools(&state.db).await?,
    }))
}

/// Detaches one tool; detaching a tool that is not a member still succeeds
pub async fn remove_tool(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, tool_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Message>> {
    let collection = owned_collection(&state, id, auth.user_id).await?;
    Collection::detach_tool(&state.db, collection.id, tool_id).await?;

    Ok(Json(Message::new("Tool removed from collection")))
}
