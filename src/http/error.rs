//! Service errors rendered as JSON HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::orders::OrderError;

/// An error on its way out of a handler.
///
/// Server-side failures are logged with their cause here; the client only
/// sees a generic message for them.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
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

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "insufficient permissions")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn internal(err: &(dyn std::error::Error + 'static)) -> Self {
        error!(error = %err, source = ?err.source().map(ToString::to_string), "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    fn unavailable(err: &(dyn std::error::Error + 'static)) -> Self {
        error!(error = %err, "Request deadline exceeded");
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service temporarily unavailable")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            e if e.is_validation() => ApiError::bad_request(e.to_string()),
            OrderError::NotFound { .. } => ApiError::not_found(err.to_string()),
            OrderError::InvalidTransition { .. } => {
                ApiError::new(StatusCode::CONFLICT, err.to_string())
            }
            OrderError::Deadline(_) => ApiError::unavailable(&err),
            _ => ApiError::internal(&err),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::Invalid(_) => ApiError::bad_request(err.to_string()),
            CatalogError::NotFound { .. } => ApiError::not_found(err.to_string()),
            CatalogError::Deadline(_) => ApiError::unavailable(&err),
            CatalogError::Storage { .. } => ApiError::internal(&err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Invalid(_) => ApiError::bad_request(err.to_string()),
            AuthError::EmailTaken { .. } => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidToken(_) => ApiError::unauthorized(err.to_string()),
            AuthError::Forbidden => ApiError::forbidden(),
            AuthError::UserNotFound { .. } => ApiError::not_found(err.to_string()),
            AuthError::Deadline(_) => ApiError::unavailable(&err),
            AuthError::Signing(_)
            | AuthError::Hashing(_)
            | AuthError::Storage { .. }
            | AuthError::Internal(_) => ApiError::internal(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::OrderStatus;
    use crate::interfaces::StorageError;
    use crate::utils::deadline::DeadlineExceeded;

    #[test]
    fn test_order_error_status_codes() {
        let cases = [
            (OrderError::EmptyCart, StatusCode::BAD_REQUEST),
            (
                OrderError::UnknownProduct {
                    product_id: Uuid::new_v4(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                OrderError::NotFound {
                    order_id: Uuid::new_v4(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                OrderError::InvalidTransition {
                    from: OrderStatus::Completed,
                    to: OrderStatus::Pending,
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_commit_failure_hides_driver_detail() {
        let err = OrderError::CommitFailed {
            order_id: Uuid::new_v4(),
            source: StorageError::Connection("socket closed by peer 10.0.0.7".to_string()),
        };
        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message().contains("10.0.0.7"));
    }

    #[test]
    fn test_commit_timeout_is_internal_error() {
        let err = OrderError::CommitFailed {
            order_id: Uuid::new_v4(),
            source: StorageError::from(DeadlineExceeded {
                operation: "insert_order",
                limit: std::time::Duration::from_millis(50),
            }),
        };
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::EmailTaken {
                email: "a@b.c".to_string()
            })
            .status(),
            StatusCode::CONFLICT
        );
    }
}
