use std::sync::Arc;

use anyhow::Result;
use solar_client::db::solar_plant_queries::ensure_schema;
use solar_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, observability,
    store::PgSolarStore,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let cfg = AppConfig::load()?;

    let log_path = observability::init_tracing(&cfg.logging)?;
    tracing::info!(log_file = %log_path.display(), "logging initialised");

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    ensure_schema(&pool).await?;

    let store = Arc::new(PgSolarStore::new(pool, cfg.ingest.batch_size));
    let app = api::router(AppState::new(store, cfg.ingest.csv_path.clone()));

    let listener = tokio::net::TcpListener::bind(&cfg.http.bind_addr).await?;
    tracing::info!(
        bind_addr = %cfg.http.bind_addr,
        csv_path = %cfg.ingest.csv_path.display(),
        "solar plant data API listening"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    Ok(())
}
