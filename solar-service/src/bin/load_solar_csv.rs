use anyhow::{bail, Result};
use solar_client::db::solar_plant_queries::ensure_schema;
use solar_service::{config::AppConfig, ingest::ingest_csv_file, observability, store::PgSolarStore};
use sqlx::postgres::PgPoolOptions;
use std::{env, path::Path, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: load_solar_csv <csv_file_path>");
    }
    let file_path = Path::new(&args[1]);

    // Load configuration (SOLAR_CONFIG may point at a loader-specific file).
    let cfg = AppConfig::load()?;
    observability::init_tracing(&cfg.logging)?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;
    ensure_schema(&pool).await?;

    let store = Arc::new(PgSolarStore::new(pool, cfg.ingest.batch_size));
    let report = ingest_csv_file(store, file_path).await?;

    println!(
        "inserted {} of {} rows ({} dropped)",
        report.rows_inserted, report.rows_read, report.rows_dropped
    );
    Ok(())
}
