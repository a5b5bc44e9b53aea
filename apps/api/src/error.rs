//! Error types for the API server.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse`
//! impl renders the body as `{"error": "<message>"}` so business
//! failures reach clients with their exact messages ("Cart is empty",
//! "Not enough stock for <name>"). Storage failures collapse to a
//! generic 500 so internals never leak.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::{CheckoutError, DbError};

/// An HTTP-ready error: status code plus client-facing message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::EmptyCart | CoreError::InsufficientStock { .. } => {
                ApiError::bad_request(err.to_string())
            }
            CoreError::ProductNotFound(_) => ApiError::not_found(err.to_string()),
            CoreError::Validation(_) => ApiError::bad_request(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::bad_request(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::bad_request(err.to_string()),
            _ => {
                error!(?err, "Storage failure");
                ApiError::internal()
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            // At checkout every business failure is a rejected request,
            // including a product that vanished after being carted.
            CheckoutError::Core(core) => ApiError::bad_request(core.to_string()),
            CheckoutError::Db(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_bad_requests() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Cart is empty");

        let err: ApiError = CoreError::InsufficientStock {
            name: "Widget".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Not enough stock for Widget");
    }

    #[test]
    fn test_missing_product_is_not_found_outside_checkout() {
        let err: ApiError = CoreError::ProductNotFound("p-1".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_product_is_bad_request_at_checkout() {
        let err: ApiError =
            CheckoutError::Core(CoreError::ProductNotFound("p-1".to_string())).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_internals_do_not_leak() {
        let err: ApiError = DbError::Internal("connection pool poisoned".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
