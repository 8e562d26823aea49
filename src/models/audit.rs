//! Inventory audit report models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One book whose ledger and borrow records disagree.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Discrepancy {
    pub book_id: i32,
    pub title: String,
    pub total_copies: i32,
    pub available_copies: i32,
    /// Copies the ledger says are out: total minus available.
    pub ledger_outstanding: i32,
    /// Borrow records currently BORROWED for this book.
    pub active_borrows: i64,
    /// active_borrows minus ledger_outstanding. Non-zero means drift.
    pub drift: i64,
}

/// Result of a full inventory audit pass.
///
/// The audit only reports. Fixing a drifted book is a separate, explicit
/// operator action.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditReport {
    pub ran_at: DateTime<Utc>,
    pub books_checked: i64,
    pub discrepancies: Vec<Discrepancy>,
}

/// Outcome of an operator-requested inventory repair for one book.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RepairOutcome {
    pub book_id: i32,
    pub active_borrows: i64,
    pub previous_available: i32,
    pub corrected_available: i32,
    pub repaired_by: String,
}
