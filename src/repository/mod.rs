//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod fines;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
    pub fines: fines::FinesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            pool,
        }
    }
}
