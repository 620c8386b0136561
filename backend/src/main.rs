use anyhow::{Context, Result};
use backend::{axum_http::http_serve, config::config_loader};
use crates::infra::db::postgres::postgres_connection;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!(error = ?error, "backend: exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let config = config_loader::load().context("failed to load configuration")?;
    info!(stage = %config.stage, "backend: configuration loaded");
    if !config.chain.strict {
        warn!("backend: payment fallback enabled, unconfigured networks are accepted without verification");
    }

    let postgres_pool = postgres_connection::establish_connection(&config.database.url)?;

    http_serve::start(Arc::new(config), Arc::new(postgres_pool)).await
}
