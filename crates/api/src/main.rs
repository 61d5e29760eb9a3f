use anyhow::Result;
use tracing::info;

use roster_api::{
    app::create_app,
    config::Config,
    middleware::{init_logging, init_metrics},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;
    info!("Starting Roster API v{}", env!("CARGO_PKG_VERSION"));

    init_metrics()?;

    let storage = persistence::storage::connect(&config.database).await?;

    info!(backend = storage.backend(), "Running migrations...");
    storage.migrate().await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;
    let app = create_app(config, storage);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
