use std::sync::Arc;

use access_control::{InMemoryOverrideStore, PermissionResolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecogo_admin_api::config::Config;
use ecogo_admin_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ecogo_admin_api=debug,access_control=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    // Per-principal overrides, consulted before the static role table
    let overrides = match &config.access.overrides_file {
        Some(path) => InMemoryOverrideStore::from_json_file(path).await?,
        None => InMemoryOverrideStore::new(),
    };
    let resolver = PermissionResolver::new(Arc::new(overrides));

    let state = AppState { config: config.clone(), resolver };
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
