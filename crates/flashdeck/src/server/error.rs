//! Mapping from [`Error`] and extractor rejections to HTTP responses.
//!
//! Response bodies carry a short generic message; store failures are logged
//! with their full detail instead.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error};

use crate::error::Error;

/// An error response: a status code and a JSON body `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Create an error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The status code this error is sent with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message placed in the response body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// A request body that could not be decoded.
    #[must_use]
    pub fn invalid_payload(rejection: &JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        Self::new(StatusCode::BAD_REQUEST, "Invalid request payload")
    }

    /// An id path segment that is not an integer.
    #[must_use]
    pub fn invalid_id(rejection: &PathRejection) -> Self {
        debug!("Rejected flashcard id: {}", rejection.body_text());
        Self::new(StatusCode::BAD_REQUEST, "Invalid flashcard ID")
    }

    /// Map a store error, using `context` as the body of a 500 response.
    #[must_use]
    pub fn from_store(context: &'static str, err: Error) -> Self {
        match err {
            Error::NotFound { id } => {
                debug!("Flashcard {id} not found");
                Self::new(StatusCode::NOT_FOUND, "Flashcard not found")
            }
            Error::Validation { .. } => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                error!("{context}: {other}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from_store("Failed to get flashcard", Error::NotFound { id: 3 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Flashcard not found");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from_store("Failed to add flashcard", Error::validation("answer"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("answer"));
    }

    #[test]
    fn test_store_failure_hides_detail() {
        let err = ApiError::from_store(
            "Failed to add flashcard",
            Error::DatabaseQuery(rusqlite::Error::InvalidQuery),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to add flashcard");
    }

    #[test]
    fn test_internal_error_maps_to_500() {
        let err = ApiError::from_store("Failed to get flashcards", Error::internal("poisoned"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("poisoned"));
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = ApiError::new(StatusCode::BAD_REQUEST, "nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
