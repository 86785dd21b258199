use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tanmatsu::config::Config;
use tanmatsu::database::MySqlImageStore;
use tanmatsu::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up TANMATSU_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let version = server::version_banner();
    if config.print_version {
        println!("{}", version);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    config.validate()?;
    tracing::info!(issuer = %config.security.issuer, "Starting {}", version);

    let store = MySqlImageStore::connect(&config.database)
        .await
        .context("creating store")?;

    let state = AppState::from_config(Arc::new(store), &config, version);
    server::serve(&config, server::build_router(state)).await?;

    Ok(())
}
