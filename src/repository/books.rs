//! Books repository: the inventory ledger
//!
//! `available_copies` is mutated here and nowhere else. Each mutation is a
//! single guarded UPDATE executed inside the caller's lifecycle transaction,
//! so the bounds check and the count change cannot be split by a concurrent
//! writer.

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Take one copy for a loan.
    ///
    /// The decrement and its stock guard are one statement, so two approvals
    /// racing for the last copy cannot both succeed: the loser sees zero
    /// rows affected and gets `OutOfStock`.
    pub async fn reserve_copy(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<()> {
        let res = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 WHERE id = $1 AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

        if res.rows_affected() == 0 {
            return Err(if self.exists(tx, book_id).await? {
                AppError::OutOfStock { book_id }
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }
        Ok(())
    }

    /// Give one copy back.
    ///
    /// Exceeding `total_copies` is refused, not clamped: it means the borrow
    /// records and the ledger already disagree, and the caller's transaction
    /// must roll back rather than paper over it.
    pub async fn release_copy(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<()> {
        let res = sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1 WHERE id = $1 AND available_copies < total_copies",
        )
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

        if res.rows_affected() == 0 {
            return Err(if self.exists(tx, book_id).await? {
                AppError::OverRelease { book_id }
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }
        Ok(())
    }

    async fn exists(&self, tx: &mut Transaction<'_, Postgres>, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(exists)
    }
}
