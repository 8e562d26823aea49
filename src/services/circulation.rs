//! Borrow lifecycle service
//!
//! request -> approve -> (renew) -> return, or request -> reject. Approval
//! and return touch the borrow record and the inventory ledger in one
//! database transaction; a failure of either half rolls back both. Lock
//! order inside those transactions is the borrow record, then the book.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::book::Book,
    models::borrow::{BorrowRecord, BorrowStatus, OverdueBorrow, TransitionEffects},
    models::user::UserStatus,
    repository::Repository,
    services::directory::UserDirectory,
    services::fines::{compute_fine, days_overdue},
    services::notify::{BorrowEvent, Notifier},
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: CirculationConfig,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl CirculationService {
    pub fn new(
        repository: Repository,
        config: CirculationConfig,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository,
            config,
            directory,
            notifier,
        }
    }

    /// Get a borrow record by ID
    pub async fn get_record(&self, record_id: i32) -> AppResult<BorrowRecord> {
        self.repository.borrows.get_by_id(record_id).await
    }

    /// All records for a user, newest first
    pub async fn user_borrows(&self, user_id: i32) -> AppResult<Vec<BorrowRecord>> {
        self.repository.borrows.list_for_user(user_id).await
    }

    /// The approval queue: pending requests, oldest first
    pub async fn pending_queue(&self, limit: Option<i64>) -> AppResult<Vec<BorrowRecord>> {
        self.repository.borrows.list_pending(limit).await
    }

    /// Read-only catalog lookup with current copy counts
    pub async fn book_availability(&self, book_id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(book_id).await
    }

    /// File a borrow request: a PENDING record, no inventory effect.
    ///
    /// Eligibility gates run first. Availability is deliberately not one of
    /// them: a request for a fully-lent book simply waits in the queue.
    pub async fn request_borrow(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let status = self.directory.get_status(user_id).await?;
        if status != UserStatus::Approved {
            return Err(AppError::Ineligible(format!(
                "user {} account status is {}, not APPROVED",
                user_id, status
            )));
        }

        let book = self.repository.books.get_by_id(book_id).await?;
        if !book.is_active {
            return Err(AppError::Ineligible(format!("book {} is not active", book_id)));
        }

        if self.repository.borrows.has_active(user_id, book_id).await? {
            return Err(AppError::DuplicateActiveBorrow { user_id, book_id });
        }

        let record = self.repository.borrows.create(user_id, book_id).await?;
        tracing::info!(record_id = record.id, user_id, book_id, "borrow requested");

        self.notify(BorrowEvent::Requested(record.clone())).await;
        Ok(record)
    }

    /// Approve a pending request: reserve one copy and move the record to
    /// BORROWED with a due date, atomically.
    ///
    /// Out of stock aborts the transaction: the record stays PENDING and the
    /// ledger is untouched.
    pub async fn approve_borrow(
        &self,
        record_id: i32,
        operator: &str,
        loan_period_days: Option<u32>,
    ) -> AppResult<BorrowRecord> {
        let days = loan_period_days.unwrap_or(self.config.loan_period_days);

        let mut tx = self.repository.pool.begin().await?;

        let record = self.repository.borrows.get_for_update(&mut tx, record_id).await?;
        if record.status != BorrowStatus::Pending {
            return Err(AppError::InvalidTransition {
                record_id,
                from: record.status,
                to: BorrowStatus::Borrowed,
            });
        }

        self.repository.books.reserve_copy(&mut tx, record.book_id).await?;

        let due_date = Utc::now() + Duration::days(i64::from(days));
        let approved = self
            .repository
            .borrows
            .transition(
                &mut tx,
                record_id,
                BorrowStatus::Pending,
                BorrowStatus::Borrowed,
                TransitionEffects {
                    due_date: Some(due_date),
                    ..Default::default()
                },
                operator,
            )
            .await?;

        tx.commit().await?;
        tracing::info!(record_id, operator, %due_date, "borrow approved");

        self.notify(BorrowEvent::Approved(approved.clone())).await;
        Ok(approved)
    }

    /// Reject a pending request. Terminal; never touches inventory.
    pub async fn reject_borrow(
        &self,
        record_id: i32,
        operator: &str,
        note: Option<String>,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.repository.pool.begin().await?;
        let rejected = self
            .repository
            .borrows
            .transition(
                &mut tx,
                record_id,
                BorrowStatus::Pending,
                BorrowStatus::Rejected,
                TransitionEffects {
                    note,
                    ..Default::default()
                },
                operator,
            )
            .await?;
        tx.commit().await?;
        tracing::info!(record_id, operator, "borrow rejected");

        self.notify(BorrowEvent::Rejected(rejected.clone())).await;
        Ok(rejected)
    }

    /// Return a borrowed book: store the fine, move the record to RETURNED
    /// and release the copy, atomically.
    ///
    /// The fine is computed from the daily rate in force at this moment,
    /// read inside the same transaction. An over-release aborts the whole
    /// return, leaving the record BORROWED.
    pub async fn return_book(&self, record_id: i32, operator: &str) -> AppResult<BorrowRecord> {
        let mut tx = self.repository.pool.begin().await?;

        let record = self.repository.borrows.get_for_update(&mut tx, record_id).await?;
        if record.status != BorrowStatus::Borrowed {
            return Err(AppError::InvalidTransition {
                record_id,
                from: record.status,
                to: BorrowStatus::Returned,
            });
        }
        let due_date = record.due_date.ok_or_else(|| {
            AppError::Internal(format!("borrowed record {} has no due date", record_id))
        })?;

        let daily_rate = self.repository.fines.daily_rate(&mut tx).await?;
        let now = Utc::now();
        let fine = compute_fine(due_date, now, daily_rate);

        let returned = self
            .repository
            .borrows
            .transition(
                &mut tx,
                record_id,
                BorrowStatus::Borrowed,
                BorrowStatus::Returned,
                TransitionEffects {
                    return_date: Some(now),
                    fine_amount: Some(fine),
                    ..Default::default()
                },
                operator,
            )
            .await?;

        self.repository.books.release_copy(&mut tx, record.book_id).await?;

        tx.commit().await?;
        tracing::info!(record_id, operator, fine = %returned.fine_amount, "borrow returned");

        self.notify(BorrowEvent::Returned(returned.clone())).await;
        Ok(returned)
    }

    /// Extend a loan's due date from its current value. Refused once the
    /// loan is overdue, off BORROWED, or at the renewal cap. No inventory
    /// effect.
    pub async fn renew_borrow(
        &self,
        record_id: i32,
        operator: &str,
        extension_days: Option<u32>,
    ) -> AppResult<BorrowRecord> {
        let days = extension_days.unwrap_or(self.config.renewal_extension_days);
        let renewed = self
            .repository
            .borrows
            .renew(record_id, days as i32, self.config.max_renewals, operator)
            .await?;
        tracing::info!(record_id, operator, renewal = renewed.renewal_count, "borrow renewed");

        self.notify(BorrowEvent::Renewed(renewed.clone())).await;
        Ok(renewed)
    }

    /// Open loans past due, each with the fine it would incur at the
    /// current daily rate.
    pub async fn overdue_borrows(&self, limit: Option<i64>) -> AppResult<Vec<OverdueBorrow>> {
        let records = self.repository.borrows.list_overdue(limit).await?;
        let rate = self.repository.fines.get().await?.daily_fine_amount;
        let now = Utc::now();

        Ok(records
            .into_iter()
            .map(|record| {
                let due = record.due_date.unwrap_or(now);
                OverdueBorrow {
                    days_overdue: days_overdue(due, now),
                    accrued_fine: compute_fine(due, now, rate),
                    record,
                }
            })
            .collect())
    }

    /// Notify the collaborator about every overdue loan. Returns how many
    /// events were handed over.
    pub async fn sweep_overdue(&self) -> AppResult<usize> {
        let overdue = self.overdue_borrows(None).await?;
        let count = overdue.len();
        for item in overdue {
            let days = item.days_overdue;
            self.notify(BorrowEvent::Overdue {
                record: item.record,
                days_overdue: days,
            })
            .await;
        }
        Ok(count)
    }

    async fn notify(&self, event: BorrowEvent) {
        if let Err(e) = self.notifier.send(&event).await {
            tracing::warn!(event = event.kind(), error = %e, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::directory::MockUserDirectory;
    use crate::services::notify::MockNotifier;
    use sqlx::postgres::PgPoolOptions;

    // Never connects: every gate under test fails before any query runs.
    fn lazy_repository() -> Repository {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .expect("lazy pool");
        Repository::new(pool)
    }

    fn service(directory: MockUserDirectory) -> CirculationService {
        CirculationService::new(
            lazy_repository(),
            CirculationConfig::default(),
            Arc::new(directory),
            Arc::new(MockNotifier::new()),
        )
    }

    #[tokio::test]
    async fn test_pending_account_cannot_request() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_get_status()
            .returning(|_| Ok(UserStatus::Pending));

        let err = service(directory).request_borrow(7, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Ineligible(_)));
    }

    #[tokio::test]
    async fn test_rejected_account_cannot_request() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_get_status()
            .returning(|_| Ok(UserStatus::Rejected));

        let err = service(directory).request_borrow(7, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Ineligible(_)));
    }

    #[tokio::test]
    async fn test_unknown_user_propagates_not_found() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_get_status()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));

        let err = service(directory).request_borrow(7, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
