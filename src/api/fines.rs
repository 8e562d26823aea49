//! Fine configuration endpoints

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    error::{AppError, AppResult},
    models::fine::FineConfig,
};

use super::Operator;

/// Daily rate update body
#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateFineConfigRequest {
    /// Fine charged per calendar day overdue
    #[validate(custom(function = "validate_daily_rate"))]
    pub daily_fine_amount: Decimal,
}

fn validate_daily_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() {
        return Err(ValidationError::new("negative_rate"));
    }
    if rate.scale() > 2 {
        return Err(ValidationError::new("sub_cent_rate"));
    }
    Ok(())
}

/// Get the current fine configuration
#[utoipa::path(
    get,
    path = "/config/fines",
    tag = "config",
    responses(
        (status = 200, description = "Current daily rate", body = FineConfig)
    )
)]
pub async fn get_fine_config(State(state): State<crate::AppState>) -> AppResult<Json<FineConfig>> {
    let config = state.services.fines.get_config().await?;
    Ok(Json(config))
}

/// Update the daily fine rate
#[utoipa::path(
    put,
    path = "/config/fines",
    tag = "config",
    request_body = UpdateFineConfigRequest,
    responses(
        (status = 200, description = "Rate updated, applies to all future calculations", body = FineConfig),
        (status = 400, description = "Invalid rate")
    )
)]
pub async fn update_fine_config(
    State(state): State<crate::AppState>,
    Operator(operator): Operator,
    Json(request): Json<UpdateFineConfigRequest>,
) -> AppResult<Json<FineConfig>> {
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let config = state
        .services
        .fines
        .set_daily_rate(request.daily_fine_amount, &operator)
        .await?;
    Ok(Json(config))
}
