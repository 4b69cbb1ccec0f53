// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::services::ListingError;
use crate::storage::StorageError;

/// HTTP error taxonomy with client-safe messages.
///
/// Internal detail (the payload of `Persistence`/`Internal` and non-rejection
/// `Storage` errors) is logged when the response is built, never returned to
/// the client.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized
    AuthenticationRequired(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error (transactional store failure)
    Persistence(String),

    // 400 for upload rejections, 500 for store I/O failures
    Storage { message: String, rejection: bool },

    // 500 Internal Server Error (anything else)
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage { rejection: true, .. } => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::AuthenticationRequired(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Persistence(_) => "Database error".to_string(),
            ApiError::Storage { message, rejection: true } => message.clone(),
            ApiError::Storage { .. } => "Server error".to_string(),
            ApiError::Internal(_) => "Server error".to_string(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::Persistence(detail) => error!(%detail, "database failure"),
            ApiError::Storage { message, rejection: false } => {
                error!(detail = %message, "photo store failure")
            }
            ApiError::Internal(detail) => error!(%detail, "internal error"),
            _ => {}
        }

        (self.status_code(), Json(self.to_json())).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Persistence(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let rejection = err.is_rejection();
        ApiError::Storage { message: err.to_string(), rejection }
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::Validation(msg) => ApiError::Validation(msg),
            ListingError::Forbidden => ApiError::Forbidden("You do not own this property".to_string()),
            ListingError::NotFound => ApiError::NotFound("Property not found".to_string()),
            ListingError::Storage(e) => e.into(),
            ListingError::Persistence(e) => ApiError::Persistence(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_rejections_are_client_errors() {
        let err = ApiError::from(StorageError::TooLarge { size: 11, max_bytes: 10 });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(StorageError::Io(std::io::Error::other("boom")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Server error");
    }

    #[test]
    fn listing_errors_map_to_http_statuses() {
        assert_eq!(
            ApiError::from(ListingError::Validation("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ListingError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ListingError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn persistence_detail_stays_out_of_the_body() {
        let err = ApiError::Persistence("connection reset by peer".to_string());
        assert_eq!(err.to_json(), json!({ "error": "Database error" }));
    }
}
