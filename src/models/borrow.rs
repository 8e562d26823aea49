//! Borrow record model and status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle status of a borrow record.
///
/// `Pending` is the initial state. `Returned` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "borrow_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BorrowStatus {
    Pending,
    Borrowed,
    Returned,
    Rejected,
}

impl BorrowStatus {
    /// The legal transitions: approval, rejection and return.
    pub fn can_transition(self, to: BorrowStatus) -> bool {
        matches!(
            (self, to),
            (BorrowStatus::Pending, BorrowStatus::Borrowed)
                | (BorrowStatus::Pending, BorrowStatus::Rejected)
                | (BorrowStatus::Borrowed, BorrowStatus::Returned)
        )
    }

    /// True for states no transition may leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, BorrowStatus::Returned | BorrowStatus::Rejected)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BorrowStatus::Pending => "PENDING",
            BorrowStatus::Borrowed => "BORROWED",
            BorrowStatus::Returned => "RETURNED",
            BorrowStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", label)
    }
}

/// One user's claim on one copy of one book.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: BorrowStatus,
    pub borrow_date: DateTime<Utc>,
    /// Set at approval: approval date plus the loan period.
    pub due_date: Option<DateTime<Utc>>,
    /// Set at return.
    pub return_date: Option<DateTime<Utc>>,
    /// Final fine, stored at return. 0.00 until then.
    pub fine_amount: Decimal,
    pub renewal_count: i16,
    pub notes: Option<String>,
    pub borrowed_by: Option<String>,
    pub returned_by: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Field effects applied together with a status transition.
#[derive(Debug, Default, Clone)]
pub struct TransitionEffects {
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub fine_amount: Option<Decimal>,
    pub note: Option<String>,
}

/// Open loan past due, with the fine it would incur at the current rate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverdueBorrow {
    pub record: BorrowRecord,
    pub days_overdue: i64,
    pub accrued_fine: Decimal,
}
