/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use gauss_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config, None));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{rate_limit, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use gauss_shared::{
    auth::{context::AuthContext, jwt},
    models::access_token::AccessToken,
};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,

    /// Throttle store; `None` disables throttling
    pub redis: Option<ConnectionManager>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, redis: Option<ConnectionManager>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            redis,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.jwt.ttl_hours)
    }
}

/// Builds the complete router
///
/// ```text
/// /health                               GET     public
/// /api/register, /api/login             POST    public
/// /api/resources[/:resource]            GET     public
/// /api/categories[/:category]           GET     public
/// /api/tags[/:tag]                      GET     public
///
/// /api/logout                           POST    bearer token
/// /api/me                               GET
/// /api/tools[/:id]                      CRUD
/// /api/collections[/:id]                CRUD
/// /api/collections/:id/tools            POST
/// /api/collections/:id/tools/:tool_id   DELETE
/// /api/settings                         GET, PUT
/// /api/user/profile, /api/user/password PUT
/// /api/explore/personalized, /all       GET
/// /api/resources, /categories, /tags    POST, PUT/:id, DELETE/:id
/// ```
///
/// Public routes are throttled per client IP, protected routes per user.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/resources", get(routes::resources::index))
        .route("/resources/:resource", get(routes::resources::show))
        .route("/categories", get(routes::categories::index))
        .route("/categories/:category", get(routes::categories::show))
        .route("/tags", get(routes::tags::index))
        .route("/tags/:tag", get(routes::tags::show))
        .layer(from_fn_with_state(state.clone(), rate_limit::throttle_by_ip));

    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .route(
            "/tools",
            get(routes::tools::index).post(routes::tools::store),
        )
        .route(
            "/tools/:id",
            get(routes::tools::show)
                .put(routes::tools::update)
                .delete(routes::tools::destroy),
        )
        .route(
            "/collections",
            get(routes::collections::index).post(routes::collections::store),
        )
        .route(
            "/collections/:id",
            get(routes::collections::show)
                .put(routes::collections::update)
                .delete(routes::collections::destroy),
        )
        .route("/collections/:id/tools", post(routes::collections::add_tools))
        .route(
            "/collections/:id/tools/:tool_id",
            axum::routing::delete(routes::collections::remove_tool),
        )
        .route(
            "/settings",
            get(routes::settings::show).put(routes::settings::update),
        )
        .route("/user/profile", put(routes::users::update_profile))
        .route("/user/password", put(routes::users::update_password))
        .route("/explore/personalized", get(routes::explore::personalized))
        .route("/explore/all", get(routes::explore::all))
        .route("/resources", post(routes::resources::store))
        .route(
            "/resources/:resource",
            put(routes::resources::update).delete(routes::resources::destroy),
        )
        .route("/categories", post(routes::categories::store))
        .route(
            "/categories/:category",
            put(routes::categories::update).delete(routes::categories::destroy),
        )
        .route("/tags", post(routes::tags::store))
        .route(
            "/tags/:tag",
            put(routes::tags::update).delete(routes::tags::destroy),
        )
        .layer(from_fn_with_state(state.clone(), rate_limit::throttle_by_user))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .max_age(Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Bearer token authentication
///
/// Accepts a token only if its signature and expiry check out and its
/// access-token row still exists, then hands the caller to handlers as an
/// `AuthContext` extension.
async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Unauthenticated".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    if !AccessToken::touch(&state.db, claims.jti, claims.sub).await? {
        tracing::debug!(user_id = %claims.sub, token_id = %claims.jti, "Rejected revoked token");
        return Err(ApiError::Unauthorized("Token has been revoked".to_string()));
    }

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
