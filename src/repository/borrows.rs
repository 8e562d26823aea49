//! Borrow records repository: the single writer of record status
//!
//! Every status change goes through [`BorrowsRepository::transition`], whose
//! WHERE clause re-checks the expected current status. Concurrent callers
//! serialize on the row: one wins, the rest see zero rows affected and get
//! `InvalidTransition` carrying the actual current status.

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, BorrowStatus, TransitionEffects},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Get and row-lock a record inside a lifecycle transaction.
    /// Lock order is always the record first, then the book.
    pub async fn get_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// True if the user already has a PENDING or BORROWED record for the book.
    pub async fn has_active(&self, user_id: i32, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_records WHERE user_id = $1 AND book_id = $2 AND status IN ('PENDING', 'BORROWED'))",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a PENDING record. No inventory effect.
    ///
    /// The partial unique index on active records backs up the service-level
    /// pre-check: a race between two identical requests leaves exactly one.
    pub async fn create(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let created = sqlx::query_as::<_, BorrowRecord>(
            "INSERT INTO borrow_records (user_id, book_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::DuplicateActiveBorrow { user_id, book_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `from -> to` with its field effects in one guarded statement.
    ///
    /// `borrowed_by` and `returned_by` are stamped only by the transition
    /// that reaches the matching status; `updated_by` is stamped always.
    pub async fn transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record_id: i32,
        from: BorrowStatus,
        to: BorrowStatus,
        effects: TransitionEffects,
        actor: &str,
    ) -> AppResult<BorrowRecord> {
        if !from.can_transition(to) {
            return Err(AppError::InvalidTransition { record_id, from, to });
        }

        let updated = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET
                status = $3,
                due_date = COALESCE($4, due_date),
                return_date = COALESCE($5, return_date),
                fine_amount = COALESCE($6, fine_amount),
                notes = COALESCE($7, notes),
                borrowed_by = CASE WHEN $3 = 'BORROWED'::borrow_status THEN $8 ELSE borrowed_by END,
                returned_by = CASE WHEN $3 = 'RETURNED'::borrow_status THEN $8 ELSE returned_by END,
                updated_by = $8,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(from)
        .bind(to)
        .bind(effects.due_date)
        .bind(effects.return_date)
        .bind(effects.fine_amount)
        .bind(effects.note)
        .bind(actor)
        .fetch_optional(&mut **tx)
        .await?;

        match updated {
            Some(record) => Ok(record),
            None => {
                let current = sqlx::query_scalar::<_, BorrowStatus>(
                    "SELECT status FROM borrow_records WHERE id = $1",
                )
                .bind(record_id)
                .fetch_optional(&mut **tx)
                .await?;

                Err(match current {
                    Some(actual) => AppError::InvalidTransition { record_id, from: actual, to },
                    None => {
                        AppError::NotFound(format!("Borrow record with id {} not found", record_id))
                    }
                })
            }
        }
    }

    /// Extend a BORROWED loan in one guarded statement: not overdue, under
    /// the renewal cap. The extension counts from the current due date.
    pub async fn renew(
        &self,
        record_id: i32,
        extension_days: i32,
        max_renewals: i16,
        actor: &str,
    ) -> AppResult<BorrowRecord> {
        let updated = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET
                due_date = due_date + make_interval(days => $2),
                renewal_count = renewal_count + 1,
                updated_by = $3,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'BORROWED'
              AND due_date >= NOW()
              AND renewal_count < $4
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(extension_days)
        .bind(actor)
        .bind(max_renewals)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = updated {
            return Ok(record);
        }

        // Guard failed: fetch the record to name the exact reason.
        let record = self.get_by_id(record_id).await?;
        let reason = if record.status != BorrowStatus::Borrowed {
            format!("record is {}, not BORROWED", record.status)
        } else if record.renewal_count >= max_renewals {
            format!("renewal limit reached ({}/{})", record.renewal_count, max_renewals)
        } else {
            "loan is overdue".to_string()
        };
        Err(AppError::RenewalNotAllowed { record_id, reason })
    }

    /// Pending requests, oldest first (the approval queue).
    pub async fn list_pending(&self, limit: Option<i64>) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE status = 'PENDING' ORDER BY borrow_date LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Open loans past their due date, most overdue first.
    pub async fn list_overdue(&self, limit: Option<i64>) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE status = 'BORROWED' AND due_date < NOW() ORDER BY due_date LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// All records for a user, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE user_id = $1 ORDER BY borrow_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
