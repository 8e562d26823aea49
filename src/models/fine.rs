//! Fine configuration model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Daily fine rate charged per calendar day overdue.
///
/// Singleton row. Calculations read the rate at calculation time, so a rate
/// change applies to every loan not yet returned.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FineConfig {
    #[serde(skip)]
    pub id: i16,
    pub daily_fine_amount: Decimal,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}
