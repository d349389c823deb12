use std::time::Instant;

use crate::config::ServerConfig;
use crate::db::RegistrationDb;

/// Shared state handed to every request handler.
pub struct AppState {
    pub db: RegistrationDb,
    pub config: ServerConfig,
    /// When the server started, reported by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: RegistrationDb, config: ServerConfig) -> Self {
        Self {
            db,
            config,
            started_at: Instant::now(),
        }
    }
}
