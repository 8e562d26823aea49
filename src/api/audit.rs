//! Inventory reconciliation endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::audit::{AuditReport, RepairOutcome},
};

use super::Operator;

/// Run the inventory audit
#[utoipa::path(
    get,
    path = "/audit/inventory",
    tag = "audit",
    responses(
        (status = 200, description = "Audit report; empty discrepancies means consistent", body = AuditReport)
    )
)]
pub async fn audit_inventory(State(state): State<crate::AppState>) -> AppResult<Json<AuditReport>> {
    let report = state.services.reconciliation.audit_inventory().await?;
    Ok(Json(report))
}

/// Repair one book's available count from its borrow records
#[utoipa::path(
    post,
    path = "/audit/inventory/{book_id}/repair",
    tag = "audit",
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Repair applied", body = RepairOutcome),
        (status = 404, description = "Book not found")
    )
)]
pub async fn repair_book(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Path(book_id): Path<i32>,
) -> AppResult<Json<RepairOutcome>> {
    let outcome = state.services.reconciliation.repair_book(book_id, &operator).await?;
    Ok(Json(outcome))
}
