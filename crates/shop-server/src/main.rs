mod config;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use shop_api::{AppState, AppStateInner};
use shop_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shop_server=debug,shop_api=debug,shop_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env().inspect_err(|e| error!("Invalid configuration: {}", e))?;

    // Init database
    let db = Database::open(&config.db_path)?;
    if config.seed_demo {
        if shop_api::seed::seed_demo_data(&db)? {
            warn!("Demo accounts created with well-known passwords; do not use in production");
        } else {
            info!("Database already has users, skipping demo seed");
        }
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.token_ttl,
    });

    let app = Router::new()
        .route("/health", get(health))
        .merge(shop_api::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Shop server listening on {}", config.addr);
    info!("Database: {}", config.db_path.display());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
