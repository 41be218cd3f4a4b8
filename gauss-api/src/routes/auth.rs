/// Authentication endpoints
///
/// - `POST /api/register`: create an account and sign in
/// - `POST /api/login`: exchange credentials for a bearer token
/// - `POST /api/logout`: revoke the token used for the request
/// - `GET /api/me`: the signed-in user
///
/// Tokens are HS256 JWTs whose `jti` names an `access_tokens` row; logout
/// deletes that row.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Message,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use gauss_shared::{
    auth::{context::AuthContext, jwt, password},
    models::{
        access_token::{AccessToken, AUTH_TOKEN_NAME},
        user::{CreateUser, User, DEFAULT_ROLE},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "The email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters"))]
    pub password: String,

    /// Job function; defaults to "user"
    #[validate(length(min = 1, max = 50, message = "The role must be between 1 and 50 characters"))]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "The password field is required"))]
    pub password: String,
}

/// Body returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

/// Records a new access token for `user_id` and signs the JWT naming it
pub(crate) async fn issue_token(state: &AppState, user_id: Uuid) -> ApiResult<String> {
    let record = AccessToken::create(&state.db, user_id, AUTH_TOKEN_NAME).await?;
    let claims = jwt::Claims::new(user_id, record.id, state.token_ttl());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

/// Registers a user with default settings and collections
///
/// # Errors
///
/// - `422`: validation failed or the email is taken
/// - `409`: the email was taken concurrently
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    if User::email_taken(&state.db, &req.email, None).await? {
        return Err(ApiError::field("email", "The email has already been taken"));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create_with_defaults(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        },
    )
    .await?;

    let token = issue_token(&state, user.id).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful",
            user,
            token,
        }),
    ))
}

/// Signs a user in
///
/// Accounts that predate settings or default collections get them here.
///
/// # Errors
///
/// - `401`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    User::ensure_defaults(&state.db, user.id).await?;
    let token = issue_token(&state, user.id).await?;

    Ok(Json(AuthResponse {
        message: "Login successful",
        user,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Message>> {
    AccessToken::revoke(&state.db, auth.token_id, auth.user_id).await?;
    Ok(Json(Message::new("Logout successful")))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthenticated".to_string()))?;

    Ok(Json(MeResponse { user }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauss_shared::auth::password::MIN_PASSWORD_LENGTH;

    fn register_request(password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn test_register_password_length_matches_hashing_minimum() {
        let short = "x".repeat(MIN_PASSWORD_LENGTH - 1);
        let ok = "x".repeat(MIN_PASSWORD_LENGTH);

        assert!(register_request(&short).validate().is_err());
        assert!(register_request(&ok).validate().is_ok());
    }

    #[test]
    fn test_register_rejects_bad_email_and_empty_role() {
        let mut req = register_request("secret1");
        req.email = "not-an-email".to_string();
        req.role = Some(String::new());

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("role"));
    }

    #[test]
    fn test_login_requires_password() {
        let req = LoginRequest {
            email: "demo@gauss.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("password"));
    }
}
