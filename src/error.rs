//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Transport Errors**: The backing store is unreachable or a query failed
/// - **Conflict Errors**: A booking already occupies the requested slot
/// - **Credential Errors**: Cancellation key does not match the stored key
/// - **Resource Errors**: Requested booking or FAQ does not exist
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Remote store operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Store error: {0}")]
    Database(#[from] sqlx::Error),

    /// A booking already exists for the requested (court, date, time) slot.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Slot is already booked")]
    SlotTaken,

    /// The supplied cancellation key does not match the booking's key.
    ///
    /// Returns HTTP 403 Forbidden. The comparison is an exact,
    /// case-sensitive string match.
    #[error("Wrong cancellation key")]
    WrongKey,

    /// The referenced booking or FAQ no longer exists.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Not found")]
    NotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `SlotTaken` → 409 Conflict
/// - `WrongKey` → 403 Forbidden
/// - `NotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::SlotTaken => (StatusCode::CONFLICT, "slot_taken", self.to_string()),
            AppError::WrongKey => (StatusCode::FORBIDDEN, "wrong_key", self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transport_error",
                "The booking store is unavailable".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
