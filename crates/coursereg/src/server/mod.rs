use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{admin, status, student};
use crate::server::middleware::request_logger;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

pub use middleware::request_logger::CORRELATION_HEADER;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Course management, no auth in front of it
    let admin_router = Router::new()
        .route("/courses", post(admin::post_course))
        .route(
            "/courses/:id",
            put(admin::put_course).delete(admin::delete_course),
        );

    let student_router = Router::new()
        .route("/courses", get(student::get_courses))
        .route("/register/:course_id", post(student::post_register))
        .route("/withdraw/:course_id", post(student::post_withdraw));

    Router::new()
        .route("/", get(status::get_root))
        .route("/health", get(status::get_health))
        .nest("/admin", admin_router)
        .nest("/student", student_router)
        .layer(mw::from_fn(request_logger::log_requests))
        .with_state(app_state)
}
