//! Helpers for building the JSON envelope used by the form-facing API routes.
//!
//! Successful responses look like `{"success": true, "message": "..."}` with
//! an optional record ID field, and failures look like
//! `{"success": false, "errors": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// A 200 response with a success message.
pub fn success(message: &str) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "message": message }))).into_response()
}

/// A 200 response with a success message and the ID of the affected record,
/// e.g. `success_with_id("Transaction added successfully", "transaction_id", 42)`.
pub fn success_with_id(message: &str, id_field: &str, id: i64) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": message, id_field: id })),
    )
        .into_response()
}

/// An error response with the given status code and message.
pub fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "errors": message }))).into_response()
}
