use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Renders a use-case error as the JSON error body. Server errors keep
/// their detail out of the response.
pub fn respond_error(status: StatusCode, err: &dyn std::fmt::Display) -> Response {
    let message = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(ErrorBody {
            code: status.as_u16(),
            message,
        }),
    )
        .into_response()
}
