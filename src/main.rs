use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pindrop_suggest_api::api::{create_router, AppState};
use pindrop_suggest_api::catalog::Catalog;
use pindrop_suggest_api::config::Config;
use pindrop_suggest_api::db::{self, Cache, PgPreferenceStore};
use pindrop_suggest_api::services::suggestions::SuggestionEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("pindrop_suggest_api=info,tower_http=info")
        }))
        .init();

    let pool = db::create_pool(&config.database_url).await?;
    db::postgres::run_migrations(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let catalog = Arc::new(Catalog::builtin());
    tracing::info!(groups = catalog.groups().len(), "catalog loaded");

    let store = Arc::new(PgPreferenceStore::new(pool));
    let engine = Arc::new(SuggestionEngine::new(catalog, store));
    let state = AppState::new(engine, Some(cache));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "suggestions API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush any queued cache writes before exiting
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
