//! Service entry point

use sendfolio::config::SendfolioConfig;
use sendfolio::handlers;
use sendfolio::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sendfolio::observability::init()?;

    let config = SendfolioConfig::load()?;
    let addr = format!("{}:{}", config.service.host, config.service.port);
    info!(service = %config.service.name, %addr, "Starting service");

    let state = AppState::from_config(config).await?;
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
