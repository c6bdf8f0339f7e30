use std::sync::Arc;

use db::DBService;
use server::{AppState, app, config::Config};
use services::services::{exchange::ExchangeRunner, generator::SimulatedGenerator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = DBService::connect(&config.database_url).await?;
    let generator = Arc::new(SimulatedGenerator::new(config.generator.clone()));
    let state = AppState {
        exchanges: ExchangeRunner::new(db.clone(), generator),
        db,
    };

    let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "chat server listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
