//! Borrow lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, OverdueBorrow},
};

use super::Operator;

/// Borrow request body
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequest {
    /// Requesting user ID
    #[validate(range(min = 1, message = "user_id must be positive"))]
    pub user_id: i32,
    /// Requested book ID
    #[validate(range(min = 1, message = "book_id must be positive"))]
    pub book_id: i32,
}

/// Approval body (all fields optional)
#[derive(Deserialize, Validate, ToSchema, Default)]
pub struct ApproveBorrowRequest {
    /// Override of the configured loan period
    #[validate(range(min = 1, max = 365, message = "Loan period must be between 1 and 365 days"))]
    pub loan_period_days: Option<u32>,
}

/// Rejection body (all fields optional)
#[derive(Deserialize, Validate, ToSchema, Default)]
pub struct RejectBorrowRequest {
    /// Reason recorded on the request
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Renewal body (all fields optional)
#[derive(Deserialize, Validate, ToSchema, Default)]
pub struct RenewBorrowRequest {
    /// Override of the configured extension
    #[validate(range(min = 1, max = 365, message = "Extension must be between 1 and 365 days"))]
    pub extension_days: Option<u32>,
}

/// Listing window for queue endpoints
#[derive(Deserialize, IntoParams)]
pub struct QueueQuery {
    /// Maximum records returned (default 50)
    pub limit: Option<i64>,
}

/// Overdue sweep outcome
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Overdue loans handed to the notifier
    pub notified: usize,
}

/// File a borrow request
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow request created, pending approval", body = BorrowRecord),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "User already has an active borrow for this book"),
        (status = 422, description = "Account not approved or book inactive")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .services
        .circulation
        .request_borrow(request.user_id, request.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a borrow record
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Borrow record", body = BorrowRecord),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_borrow(
    State(state): State<crate::AppState>,
    Path(record_id): Path<i32>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.circulation.get_record(record_id).await?;
    Ok(Json(record))
}

/// Approve a pending borrow request
#[utoipa::path(
    post,
    path = "/borrows/{id}/approve",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    request_body = ApproveBorrowRequest,
    responses(
        (status = 200, description = "Request approved, one copy reserved", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Record is not pending, or no copies available")
    )
)]
pub async fn approve_borrow(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Path(record_id): Path<i32>,
    body: Option<Json<ApproveBorrowRequest>>,
) -> AppResult<Json<BorrowRecord>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .services
        .circulation
        .approve_borrow(record_id, &operator, request.loan_period_days)
        .await?;
    Ok(Json(record))
}

/// Reject a pending borrow request
#[utoipa::path(
    post,
    path = "/borrows/{id}/reject",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    request_body = RejectBorrowRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Record is not pending")
    )
)]
pub async fn reject_borrow(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Path(record_id): Path<i32>,
    body: Option<Json<RejectBorrowRequest>>,
) -> AppResult<Json<BorrowRecord>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .services
        .circulation
        .reject_borrow(record_id, &operator, request.note)
        .await?;
    Ok(Json(record))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Book returned, fine stored on the record", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Record is not borrowed")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Path(record_id): Path<i32>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.circulation.return_book(record_id, &operator).await?;
    Ok(Json(record))
}

/// Renew a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/renew",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    request_body = RenewBorrowRequest,
    responses(
        (status = 200, description = "Due date extended", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Loan overdue, not borrowed, or renewal cap reached")
    )
)]
pub async fn renew_borrow(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Path(record_id): Path<i32>,
    body: Option<Json<RenewBorrowRequest>>,
) -> AppResult<Json<BorrowRecord>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .services
        .circulation
        .renew_borrow(record_id, &operator, request.extension_days)
        .await?;
    Ok(Json(record))
}

/// Get all borrow records for a user
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "borrows",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's borrow records, newest first", body = Vec<BorrowRecord>)
    )
)]
pub async fn user_borrows(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let records = state.services.circulation.user_borrows(user_id).await?;
    Ok(Json(records))
}

/// List pending borrow requests
#[utoipa::path(
    get,
    path = "/borrows/pending",
    tag = "borrows",
    params(QueueQuery),
    responses(
        (status = 200, description = "Approval queue, oldest first", body = Vec<BorrowRecord>)
    )
)]
pub async fn pending_borrows(
    State(state): State<crate::AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    // Apply sane defaults and bounds for limit
    let mut limit = query.limit.unwrap_or(50);
    if limit < 1 {
        limit = 1;
    }
    if limit > 1000 {
        limit = 1000;
    }

    let records = state.services.circulation.pending_queue(Some(limit)).await?;
    Ok(Json(records))
}

/// List overdue loans with accrued fines
#[utoipa::path(
    get,
    path = "/borrows/overdue",
    tag = "borrows",
    params(QueueQuery),
    responses(
        (status = 200, description = "Overdue loans, most overdue first", body = Vec<OverdueBorrow>)
    )
)]
pub async fn overdue_borrows(
    State(state): State<crate::AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<Vec<OverdueBorrow>>> {
    // Apply sane defaults and bounds for limit
    let mut limit = query.limit.unwrap_or(50);
    if limit < 1 {
        limit = 1;
    }
    if limit > 1000 {
        limit = 1000;
    }

    let overdue = state.services.circulation.overdue_borrows(Some(limit)).await?;
    Ok(Json(overdue))
}

/// Notify about every overdue loan
#[utoipa::path(
    post,
    path = "/borrows/overdue/sweep",
    tag = "borrows",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse)
    )
)]
pub async fn sweep_overdue(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
) -> AppResult<Json<SweepResponse>> {
    let notified = state.services.circulation.sweep_overdue().await?;
    tracing::info!(%operator, notified, "overdue sweep requested");
    Ok(Json(SweepResponse { notified }))
}
