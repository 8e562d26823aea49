//! Fine configuration repository

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::fine::FineConfig,
};

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Current fine configuration (singleton row).
    pub async fn get(&self) -> AppResult<FineConfig> {
        sqlx::query_as::<_, FineConfig>("SELECT * FROM fine_config WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Internal("fine_config row is missing".to_string()))
    }

    /// Daily rate read inside a lifecycle transaction, so the fine stored at
    /// return uses the rate in force at that moment.
    pub async fn daily_rate(&self, tx: &mut Transaction<'_, Postgres>) -> AppResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>("SELECT daily_fine_amount FROM fine_config WHERE id = 1")
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::Internal("fine_config row is missing".to_string()))
    }

    /// Replace the daily rate, recording the acting administrator.
    pub async fn set_daily_rate(&self, rate: Decimal, updated_by: &str) -> AppResult<FineConfig> {
        let config = sqlx::query_as::<_, FineConfig>(
            r#"
            UPDATE fine_config
            SET daily_fine_amount = $1, updated_by = $2, updated_at = NOW()
            WHERE id = 1
            RETURNING *
            "#,
        )
        .bind(rate)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(config)
    }
}
