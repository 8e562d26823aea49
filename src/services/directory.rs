//! User directory collaborator
//!
//! Borrow eligibility needs only the account standing. Everything else about
//! users (authentication, profiles, registration) lives outside this
//! service, behind this trait.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::UserStatus,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_status(&self, user_id: i32) -> AppResult<UserStatus>;
}

/// Directory backed by the local users table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: Pool<Postgres>,
}

impl PgUserDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_status(&self, user_id: i32) -> AppResult<UserStatus> {
        sqlx::query_scalar::<_, UserStatus>("SELECT status FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }
}
