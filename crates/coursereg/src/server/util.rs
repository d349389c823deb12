use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use crate::registration::RegistrationError;
use crate::server::types::ApiErrorType;

/// Parses a record ID taken from the request path.
pub fn parse_id(raw: &str) -> Result<i64, RegistrationError> {
    raw.parse().map_err(|_| RegistrationError::InvalidId {
        value: raw.to_string(),
    })
}

/// Unwraps a JSON body, turning decoding failures into a 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RegistrationError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RegistrationError::MalformedBody {
            message: rejection.body_text(),
        })
}

/// Converts a RegistrationError to an API response.
pub fn registration_error_to_response(err: RegistrationError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_internal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };

    if err.is_internal() {
        error!("Request failed: {}", err);
        return ApiErrorType::from((status, "Internal server error", Some(err.to_string())))
            .into_response();
    }

    warn!("Request rejected: {}", err);
    ApiErrorType::from((status, err.to_string())).into_response()
}
