use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use coursereg::config::ServerConfig;
use coursereg::db::RegistrationDb;
use coursereg::logging;
use coursereg::server::create_router;
use coursereg::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional path to a JSON config file
    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let config = ServerConfig::load(config_file.as_deref())?;

    logging::init(config.tracing_level()?);
    info!(?config, "Starting course registration server");

    let db = RegistrationDb::open(&config.database_path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database_path.display()
        )
    })?;

    let bind_address = config.bind_address();
    let state = Arc::new(AppState::new(db, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Server running on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
