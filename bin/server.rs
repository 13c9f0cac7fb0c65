// Numbers API - Web Server

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use numbers_api::api::{router, AppState};
use numbers_api::{init_logging, setup_database, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_filter);

    info!("Numbers API {}", numbers_api::VERSION);

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    setup_database(&conn)?;
    info!("Database opened: {:?}", config.database_path);

    let app = router(AppState::new(conn));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    info!("   API: http://{}/api/conversions", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
