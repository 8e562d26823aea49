//! Book inventory model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book with its authoritative copy counts.
///
/// `available_copies` moves only through the inventory ledger operations,
/// one step per borrow-record transition, and always satisfies
/// `0 <= available_copies <= total_copies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub is_active: bool,
}
