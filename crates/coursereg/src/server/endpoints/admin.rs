//! Administrator endpoints for managing course records.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::catalog::{self, CourseInput};
use crate::server::util::{json_body, parse_id, registration_error_to_response};
use crate::types::AppState;

/// POST /admin/courses
/// Creates a course from a full course body
pub async fn post_course(
    State(s): State<Arc<AppState>>,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> Response {
    info!("POST /admin/courses");

    match json_body(body).and_then(|input| catalog::create_course(&s.db, input)) {
        Ok(course) => (StatusCode::CREATED, Json(course)).into_response(),
        Err(e) => registration_error_to_response(e),
    }
}

/// PUT /admin/courses/:id
/// Updates only the fields present in the body
pub async fn put_course(
    Path(id): Path<String>,
    State(s): State<Arc<AppState>>,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> Response {
    info!("PUT /admin/courses/{}", id);

    let result = parse_id(&id).and_then(|course_id| {
        let patch = json_body(body)?;
        catalog::update_course(&s.db, course_id, patch)
    });

    match result {
        Ok(course) => (StatusCode::OK, Json(course)).into_response(),
        Err(e) => registration_error_to_response(e),
    }
}

/// DELETE /admin/courses/:id
pub async fn delete_course(Path(id): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("DELETE /admin/courses/{}", id);

    match parse_id(&id).and_then(|course_id| catalog::delete_course(&s.db, course_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Course deleted" }))).into_response(),
        Err(e) => registration_error_to_response(e),
    }
}
