/// Profile and password management for the signed-in user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, Message},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use gauss_shared::{
    auth::{context::AuthContext, password},
    models::{
        access_token::AccessToken,
        user::{UpdateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "The email must be a valid email address"))]
    pub email: Option<String>,

    /// `null` clears the bio
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000, message = "The bio may not be greater than 1000 characters"))]
    pub bio: Option<Option<String>>,

    #[validate(length(min = 1, max = 50, message = "The role must be between 1 and 50 characters"))]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "The current password field is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters"))]
    pub password: String,

    pub password_confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub user: User,
}

impl From<UpdateProfileRequest> for UpdateUser {
    fn from(req: UpdateProfileRequest) -> Self {
        UpdateUser {
            name: req.name,
            email: req.email,
            bio: req.bio,
            role: req.role,
        }
    }
}

/// Updates name, email, bio and role
///
/// # Errors
///
/// - `422`: validation failed or the email belongs to another account
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    if let Some(email) = &req.email {
        if User::email_taken(&state.db, email, Some(auth.user_id)).await? {
            return Err(ApiError::field("email", "The email has already been taken"));
        }
    }

    let user = User::update_profile(&state.db, auth.user_id, req.into())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthenticated".to_string()))?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully",
        user,
    }))
}

/// Changes the password after checking the current one
///
/// Every other token of the user is revoked; the one used for this request
/// stays valid.
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(req) = payload?;
    req.validate()?;

    if req.password != req.password_confirmation {
        return Err(ApiError::field(
            "password",
            "The password confirmation does not match",
        ));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthenticated".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::field(
            "current_password",
            "The current password is incorrect",
        ));
    }

    let password_hash = password::hash_password(&req.password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    let revoked = AccessToken::revoke_others(&state.db, user.id, auth.token_id).await?;
    tracing::info!(user_id = %user.id, revoked, "Password changed");

    Ok(Json(Message::new("Password updated successfully")))
}
