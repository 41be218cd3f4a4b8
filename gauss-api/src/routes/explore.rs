/// Curated explore catalog
///
/// `personalized` mixes tools matching the caller's role with a smaller
/// random sample of everything else, then shuffles the result.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use gauss_shared::{
    auth::context::AuthContext,
    models::{explore_tool::ExploreTool, user::User},
};
use rand::seq::SliceRandom;
use uuid::Uuid;

/// Number of suggestions returned by `personalized`
pub const SUGGESTION_COUNT: usize = 40;

/// Splits `total` into role matches (80%) and other tools (20%)
pub fn suggestion_split(total: usize) -> (usize, usize) {
    let matched = total * 4 / 5;
    (matched, total - matched)
}

pub async fn personalized(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ExploreTool>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthenticated".to_string()))?;

    let role = user.suggestion_role();
    let (matched_limit, other_limit) = suggestion_split(SUGGESTION_COUNT);

    let mut suggestions =
        ExploreTool::random_for_role(&state.db, role, matched_limit as i64).await?;

    let seen: Vec<Uuid> = suggestions.iter().map(|tool| tool.id).collect();
    let others = ExploreTool::random_excluding(&state.db, &seen, other_limit as i64).await?;

    tracing::debug!(
        role,
        matched = suggestions.len(),
        others = others.len(),
        "Built explore suggestions"
    );

    suggestions.extend(others);
    suggestions.shuffle(&mut rand::thread_rng());

    Ok(Json(suggestions))
}

pub async fn all(State(state): State<AppState>) -> ApiResult<Json<Vec<ExploreTool>>> {
    Ok(Json(ExploreTool::all_ranked(&state.db).await?))
}
