//! Error types for Circulo server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::borrow::BorrowStatus;

/// Stable error codes carried in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchRecord = 3,
    BadValue = 4,
    OutOfStock = 5,
    OverRelease = 6,
    StatusConflict = 7,
    DuplicateBorrow = 8,
    RenewalRefused = 9,
    NotEligible = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No available copy at approval time. The request stays pending.
    #[error("No available copies of book {book_id}")]
    OutOfStock { book_id: i32 },

    /// Releasing a copy would exceed the book's total. The ledger and the
    /// borrow records disagree somewhere upstream.
    #[error("Releasing a copy of book {book_id} would exceed its total copies")]
    OverRelease { book_id: i32 },

    /// Status guard violated: an illegal transition or a lost race.
    /// `from` is the record's actual current status.
    #[error("Invalid transition for borrow record {record_id}: {from} -> {to}")]
    InvalidTransition {
        record_id: i32,
        from: BorrowStatus,
        to: BorrowStatus,
    },

    #[error("User {user_id} already has an active borrow for book {book_id}")]
    DuplicateActiveBorrow { user_id: i32, book_id: i32 },

    #[error("Renewal not allowed for borrow record {record_id}: {reason}")]
    RenewalNotAllowed { record_id: i32, reason: String },

    /// Request-time eligibility failure: account not approved, book inactive.
    #[error("Not eligible: {0}")]
    Ineligible(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::OutOfStock { .. } => {
                (StatusCode::CONFLICT, ErrorCode::OutOfStock, self.to_string())
            }
            AppError::OverRelease { book_id } => {
                tracing::error!(book_id, "over-release refused, inventory needs reconciliation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::OverRelease,
                    self.to_string(),
                )
            }
            AppError::InvalidTransition { record_id, from, to } => {
                tracing::warn!(record_id, %from, %to, "status transition refused");
                (StatusCode::CONFLICT, ErrorCode::StatusConflict, self.to_string())
            }
            AppError::DuplicateActiveBorrow { .. } => {
                (StatusCode::CONFLICT, ErrorCode::DuplicateBorrow, self.to_string())
            }
            AppError::RenewalNotAllowed { .. } => {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::RenewalRefused,
                    self.to_string(),
                )
            }
            AppError::Ineligible(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NotEligible, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_errors_map_to_409() {
        let out_of_stock = AppError::OutOfStock { book_id: 1 }.into_response();
        assert_eq!(out_of_stock.status(), StatusCode::CONFLICT);

        let duplicate = AppError::DuplicateActiveBorrow { user_id: 1, book_id: 2 }.into_response();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let transition = AppError::InvalidTransition {
            record_id: 1,
            from: BorrowStatus::Returned,
            to: BorrowStatus::Borrowed,
        }
        .into_response();
        assert_eq!(transition.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_policy_refusals_map_to_422() {
        let renewal = AppError::RenewalNotAllowed {
            record_id: 1,
            reason: "loan is overdue".to_string(),
        }
        .into_response();
        assert_eq!(renewal.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let ineligible = AppError::Ineligible("account is PENDING".to_string()).into_response();
        assert_eq!(ineligible.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_over_release_is_a_server_error() {
        let resp = AppError::OverRelease { book_id: 9 }.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = AppError::NotFound("Borrow record with id 5 not found".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
