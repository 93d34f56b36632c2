use std::fmt::{Debug, Display};

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};

/// Maps any displayable error into a JSON `{"error": "..."}` body with the
/// given status code, logging it first. This is the sole translator from
/// internal error kinds to HTTP status codes (see the error-handling
/// design: component boundaries pass a tagged error upward, and the
/// outermost adapter is the only place that picks a wire status).
pub fn err_resp<T>(e: T, code: StatusCode) -> Response
where
    T: Display + Debug,
{
    let message = format!("{}", e);
    if code.is_server_error() {
        tracing::error!(error = ?e, %code, "request failed");
    } else {
        tracing::warn!(error = %message, %code, "request rejected");
    }
    (code, Json(serde_json::json!({ "error": message }))).into_response()
}

pub fn not_found<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::NOT_FOUND)
}

pub fn conflict<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::CONFLICT)
}

pub fn bad_request<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::BAD_REQUEST)
}

pub fn unauthorized<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::UNAUTHORIZED)
}

pub fn bad_gateway<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::BAD_GATEWAY)
}

pub fn service_unavailable<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::SERVICE_UNAVAILABLE)
}

pub fn internal_server_error<T: Display + Debug>(e: T) -> Response {
    err_resp(e, StatusCode::INTERNAL_SERVER_ERROR)
}
