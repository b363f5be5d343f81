use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use crate::services::error::{ServiceError, ServiceResult};

pub fn error_response(error: &ServiceError) -> Response {
    (
        error.status_code(),
        Json(json!({ "error": error.to_string() })),
    ).into_response()
}

/// Serializes a service result, logging and mapping failures to their status code.
pub fn into_json_response<T: Serialize>(
    result: ServiceResult<T>,
    action: &str,
) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            warn!("Something went wrong {} due to: {}", action, e);
            error_response(&e)
        }
    }
}
