//! Avanço da IA nas Empresas - dashboard server
//!
//! Serves the AI adoption dashboard on http://127.0.0.1:8501 and opens it in a browser.

use ai_adoption_dashboard::config::Config;
use ai_adoption_dashboard::web::{AppState, DashboardServer};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    tracing::info!(data = %config.data.display(), "starting dashboard");

    // A missing or malformed file does not stop the server; pages show the error.
    let state = AppState::load(&config.data);

    DashboardServer::new(config, state)
        .start()
        .await
        .context("dashboard server failed")?;

    Ok(())
}
