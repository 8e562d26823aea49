//! API handlers for Circulo REST endpoints

pub mod audit;
pub mod books;
pub mod borrows;
pub mod fines;
pub mod health;
pub mod openapi;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, AppState};

/// Header naming the staff member performing a mutating operation.
pub const OPERATOR_HEADER: &str = "x-operator-email";

/// Extractor for the acting operator's email.
///
/// Attribution only: the value is stamped into the record's audit columns.
/// Authentication and authorization belong to the surrounding deployment.
pub struct Operator(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| AppError::Validation(format!("Missing {} header", OPERATOR_HEADER)))?;

        if value.is_empty() || !value.contains('@') {
            return Err(AppError::Validation(format!(
                "{} must be the operator's email address",
                OPERATOR_HEADER
            )));
        }

        Ok(Operator(value.to_string()))
    }
}
