//! # Gauss API Server
//!
//! REST backend for the Gauss tool catalog: accounts, personal tools and
//! collections, settings, explore suggestions and the public resource
//! catalog.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p gauss-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured log lines.

use std::net::SocketAddr;

use anyhow::Context;
use gauss_api::{
    app::{build_router, AppState},
    config::Config,
};
use gauss_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use redis::aio::ConnectionManager;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Gauss API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("loading configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("connecting to the database")?;

    run_migrations(&pool).await.context("running migrations")?;

    let redis = match &config.rate_limit.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("parsing REDIS_URL")?;
            let manager = ConnectionManager::new(client)
                .await
                .context("connecting to Redis")?;
            tracing::info!(per_minute = config.rate_limit.per_minute, "Request throttling enabled");
            Some(manager)
        }
        None => {
            tracing::warn!("REDIS_URL not set, request throttling disabled");
            None
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, redis));

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("serving requests")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gauss_api=debug,gauss_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
