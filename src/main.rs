use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cruxlog::api;
use cruxlog::config::Config;
use cruxlog::db::init_database;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cruxlog=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Initialized configuration");

    // Initialize database
    let db = Arc::new(init_database(&config).await?);
    info!("Connected to database");

    // Serve until interrupted
    api::start_api_server(db, &config).await?;

    info!("cruxlog shutdown complete");
    Ok(())
}
