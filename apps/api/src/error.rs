//! # API Error Type
//!
//! Unified error type for route handlers, mapped onto HTTP statuses.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Remedy                                 │
//! │                                                                         │
//! │  ValidationError ────────────────► 400 Bad Request                     │
//! │  SaleError::InsufficientStock ───► 400 Bad Request (available units)   │
//! │  AuthError::InvalidCredentials ──► 401 Unauthorized                    │
//! │  AuthError::Unauthenticated ─────► 401 Unauthorized                    │
//! │  CoreError::Forbidden ───────────► 403 Forbidden                       │
//! │  DbError::NotFound ──────────────► 404 Not Found                       │
//! │  DbError::* (storage faults) ────► 500, generic body, details logged   │
//! │                                                                         │
//! │  Every response body is `{"message": "..."}`. Business outcomes        │
//! │  surface their message verbatim; storage faults never do.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use remedy_core::{CoreError, ValidationError};
use remedy_db::{DbError, SaleError};

use crate::auth::AuthError;

/// API error returned from route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input or a business-rule rejection (400).
    BadRequest(String),

    /// No or invalid credential (401).
    Unauthorized(String),

    /// Valid credential, insufficient role (403).
    Forbidden(String),

    /// Referenced entity absent (404).
    NotFound(String),

    /// Storage or signing failure (500). The string is logged, never sent.
    Internal(String),
}

/// JSON error body: `{"message": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            // Generic body for server faults; the detail goes to the log only.
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "Internal server error");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message) => message,
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::BadRequest(err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::BadRequest("Cannot delete: recorded sales still reference it".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::ProductNotFound(_) => ApiError::NotFound("Product not found".to_string()),
            SaleError::InsufficientStock { .. } => ApiError::BadRequest(err.to_string()),
            SaleError::Db(db) => db.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Signing(detail) => ApiError::Internal(detail),
            AuthError::Db(db) => db.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_stock_message_carries_available_units() {
        let err: ApiError = SaleError::InsufficientStock { available: 2 }.into();
        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "Insufficient stock. Only 2 units available.")
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_storage_faults_map_to_internal() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
