//! Student-facing endpoints: browsing, registering and withdrawing.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::catalog;
use crate::registration::{self, RegistrationOutcome, RegistrationRequest};
use crate::server::util::{json_body, parse_id, registration_error_to_response};
use crate::types::AppState;

/// GET /student/courses
/// Returns every course with its schedule and available spots
pub async fn get_courses(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /student/courses");

    match catalog::list_courses(&s.db) {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => registration_error_to_response(e),
    }
}

/// POST /student/register/:course_id
///
/// Body: `{ "studentId": <id>, "confirm": <bool, optional> }`
///
/// Responds 201 on registration, or 200 with a warning listing the
/// conflicting courses when the schedules overlap and `confirm` was not set.
pub async fn post_register(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response {
    info!("POST /student/register/{}", course_id);

    let outcome = parse_id(&course_id).and_then(|course_id| {
        let request = json_body(body)?;
        registration::register(&s.db, course_id, &request)
    });

    match outcome {
        Ok(RegistrationOutcome::Registered { course, student }) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Registered successfully",
                "course": course,
                "student": student,
            })),
        )
            .into_response(),
        Ok(RegistrationOutcome::ConflictWarning {
            conflicting_courses,
        }) => (
            StatusCode::OK,
            Json(json!({
                "warning": "This course conflicts with your existing schedule. Resubmit with \"confirm\": true to register anyway.",
                "conflictingCourses": conflicting_courses,
            })),
        )
            .into_response(),
        Err(e) => registration_error_to_response(e),
    }
}

/// POST /student/withdraw/:course_id
///
/// Body: `{ "studentId": <id> }`
pub async fn post_withdraw(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response {
    info!("POST /student/withdraw/{}", course_id);

    let outcome = parse_id(&course_id).and_then(|course_id| {
        let request = json_body(body)?;
        registration::withdraw(&s.db, course_id, &request)
    });

    match outcome {
        Ok((course, student)) => (
            StatusCode::OK,
            Json(json!({
                "message": "Withdrawn successfully",
                "course": course,
                "student": student,
            })),
        )
            .into_response(),
        Err(e) => registration_error_to_response(e),
    }
}
