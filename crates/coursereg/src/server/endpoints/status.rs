use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::types::AppState;

/// GET /
pub async fn get_root() -> &'static str {
    "Course Registration API is running..."
}

/// GET /health
/// Reports uptime, the configured listen address and whether the database answers queries
pub async fn get_health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let database_ok = s.db.ping().is_ok();
    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database_ok { "ok" } else { "degraded" },
            "database": database_ok,
            "listen": s.config.bind_address(),
            "uptime_secs": s.started_at.elapsed().as_secs(),
        })),
    )
}
