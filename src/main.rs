use dotenvy::dotenv;
use pawport::api::{self, AppState};
use pawport::config::{database, seed};
use pawport::core::maintenance;
use pawport::errors::{Error, Result};
use pawport::storage::BlobStore;
use std::env;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Initialize the database
    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!("Database initialized");

    // 4. Seed fixtures if a seed file is present
    let seed_path = env::var("PAWPORT_SEED_FILE").unwrap_or_else(|_| "seed.toml".to_string());
    if std::path::Path::new(&seed_path).exists() {
        let config = seed::load_seed(&seed_path)?;
        let report = maintenance::seed_fixtures(&db, &config).await?;
        info!(
            "Seeded from {seed_path}: {} users, {} products, {} templates",
            report.users, report.products, report.quote_templates
        );
    } else {
        info!("No seed file at {seed_path}, skipping");
    }

    // 5. Assemble shared state
    let jwt_secret = env::var("PAWPORT_JWT_SECRET").map_err(|e| {
        warn!("PAWPORT_JWT_SECRET not set");
        Error::EnvVar(e)
    })?;
    let blob_root =
        env::var("PAWPORT_BLOB_DIR").unwrap_or_else(|_| "data/blobs".to_string());
    let state = AppState {
        db,
        jwt_secret,
        blobs: BlobStore::new(blob_root),
    };

    // 6. Serve
    let port: u16 = env::var("PAWPORT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting API server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
