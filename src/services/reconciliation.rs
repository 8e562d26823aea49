//! Inventory reconciliation: standing audit and operator repair
//!
//! The audit compares, per book, the copies the ledger says are out with
//! the number of BORROWED records. It never writes. Repair is a separate,
//! explicit operator action scoped to one book.

use std::time::Duration;

use chrono::Utc;
use sqlx::Row;

use crate::{
    error::{AppError, AppResult},
    models::audit::{AuditReport, Discrepancy, RepairOutcome},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReconciliationService {
    repository: Repository,
}

impl ReconciliationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Database connectivity probe for the readiness endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }

    /// Full inventory audit: every book whose outstanding-copy count does
    /// not match its BORROWED record count.
    pub async fn audit_inventory(&self) -> AppResult<AuditReport> {
        let pool = &self.repository.pool;

        let discrepancies = sqlx::query_as::<_, Discrepancy>(
            r#"
            SELECT b.id AS book_id,
                   b.title,
                   b.total_copies,
                   b.available_copies,
                   b.total_copies - b.available_copies AS ledger_outstanding,
                   COALESCE(o.active, 0) AS active_borrows,
                   COALESCE(o.active, 0) - (b.total_copies - b.available_copies) AS drift
            FROM books b
            LEFT JOIN (
                SELECT book_id, COUNT(*) AS active
                FROM borrow_records
                WHERE status = 'BORROWED'
                GROUP BY book_id
            ) o ON o.book_id = b.id
            WHERE b.total_copies - b.available_copies <> COALESCE(o.active, 0)
            ORDER BY b.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        let books_checked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        Ok(AuditReport {
            ran_at: Utc::now(),
            books_checked,
            discrepancies,
        })
    }

    /// Reset one book's available count from its BORROWED records.
    ///
    /// More BORROWED records than total copies cannot be repaired from this
    /// side; the count is floored at zero and the anomaly logged.
    pub async fn repair_book(&self, book_id: i32, operator: &str) -> AppResult<RepairOutcome> {
        let mut tx = self.repository.pool.begin().await?;

        let book = sqlx::query(
            "SELECT total_copies, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let total: i32 = book.get("total_copies");
        let previous: i32 = book.get("available_copies");

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE book_id = $1 AND status = 'BORROWED'",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let corrected = (i64::from(total) - active).max(0) as i32;

        sqlx::query("UPDATE books SET available_copies = $2 WHERE id = $1")
            .bind(book_id)
            .bind(corrected)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if active > i64::from(total) {
            tracing::error!(
                book_id,
                active,
                total,
                "more BORROWED records than copies exist, repair floored at zero"
            );
        }
        tracing::warn!(book_id, operator, previous, corrected, "inventory repaired by operator");

        Ok(RepairOutcome {
            book_id,
            active_borrows: active,
            previous_available: previous,
            corrected_available: corrected,
            repaired_by: operator.to_string(),
        })
    }

    /// Periodic audit loop for the server binary. Logs drift, never repairs.
    pub async fn run_periodic(self, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match self.audit_inventory().await {
                Ok(report) if report.discrepancies.is_empty() => {
                    tracing::debug!(books = report.books_checked, "inventory audit clean");
                }
                Ok(report) => {
                    for d in &report.discrepancies {
                        tracing::error!(
                            book_id = d.book_id,
                            ledger_outstanding = d.ledger_outstanding,
                            active_borrows = d.active_borrows,
                            drift = d.drift,
                            "inventory drift detected"
                        );
                    }
                }
                Err(e) => tracing::warn!(error = %e, "inventory audit failed"),
            }
        }
    }
}
