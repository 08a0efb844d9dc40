//! Server binary: loads configuration, prepares the database, serves the router until ctrl-c.

use entity_store::{apply_schema, build_router, ensure_database_exists, seed_if_empty, AppConfig, AppState, EntityStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("entity_store=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let store = EntityStore::connect(&config.database_url, config.max_connections).await?;
    apply_schema(store.pool()).await?;
    if config.seed_sample_data {
        seed_if_empty(&store).await?;
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    let app = build_router(AppState::new(store.clone(), config));
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
