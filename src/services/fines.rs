//! Fine calculation and fine configuration

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::fine::FineConfig,
    repository::Repository,
};

/// Whole calendar days between the due date and the reference date, in UTC.
/// Non-positive while the loan is not yet late.
pub fn days_overdue(due_date: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    (reference.date_naive() - due_date.date_naive()).num_days()
}

/// Fine for a loan due at `due_date`, evaluated at `reference`.
///
/// Calendar-day granularity: a return the day after the due date is one day
/// late no matter the hour. The result always carries two decimal places.
pub fn compute_fine(
    due_date: DateTime<Utc>,
    reference: DateTime<Utc>,
    daily_rate: Decimal,
) -> Decimal {
    let days = days_overdue(due_date, reference);
    if days <= 0 {
        return Decimal::new(0, 2);
    }
    let mut fine = (Decimal::from(days) * daily_rate).round_dp(2);
    fine.rescale(2);
    fine
}

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current fine configuration
    pub async fn get_config(&self) -> AppResult<FineConfig> {
        self.repository.fines.get().await
    }

    /// Update the daily rate. Applies to every fine calculated afterwards,
    /// including loans already overdue.
    pub async fn set_daily_rate(&self, rate: Decimal, updated_by: &str) -> AppResult<FineConfig> {
        if rate < Decimal::ZERO {
            return Err(AppError::Validation(
                "daily fine rate cannot be negative".to_string(),
            ));
        }
        self.repository.fines.set_daily_rate(rate, updated_by).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_three_days_late_at_one_per_day() {
        let rate = Decimal::from_str("1.00").unwrap();
        let fine = compute_fine(utc(2024, 1, 1, 12, 0), utc(2024, 1, 4, 12, 0), rate);
        assert_eq!(fine.to_string(), "3.00");
    }

    #[test]
    fn test_ten_days_late_at_fifty_cents() {
        let rate = Decimal::from_str("0.50").unwrap();
        let fine = compute_fine(utc(2024, 5, 1, 8, 0), utc(2024, 5, 11, 8, 0), rate);
        assert_eq!(fine.to_string(), "5.00");
    }

    #[test]
    fn test_on_time_or_early_is_zero() {
        let rate = Decimal::from_str("1.00").unwrap();
        let due = utc(2024, 1, 1, 12, 0);
        assert_eq!(compute_fine(due, due, rate).to_string(), "0.00");
        assert_eq!(compute_fine(due, utc(2023, 12, 25, 12, 0), rate).to_string(), "0.00");
    }

    #[test]
    fn test_late_within_the_due_day_is_zero() {
        // due 09:00, returned 23:00 the same day: zero whole days
        let rate = Decimal::from_str("0.50").unwrap();
        let fine = compute_fine(utc(2024, 3, 10, 9, 0), utc(2024, 3, 10, 23, 0), rate);
        assert_eq!(fine.to_string(), "0.00");
    }

    #[test]
    fn test_calendar_days_not_elapsed_hours() {
        // due 23:30, returned 00:30 next day: one hour late, one calendar day
        let rate = Decimal::from_str("0.50").unwrap();
        let fine = compute_fine(utc(2024, 3, 10, 23, 30), utc(2024, 3, 11, 0, 30), rate);
        assert_eq!(fine.to_string(), "0.50");
    }

    #[test]
    fn test_rate_changes_change_the_result() {
        let due = utc(2024, 1, 1, 0, 0);
        let reference = utc(2024, 1, 4, 0, 0);
        let at_one = compute_fine(due, reference, Decimal::from_str("1.00").unwrap());
        let at_quarter = compute_fine(due, reference, Decimal::from_str("0.25").unwrap());
        assert_eq!(at_one.to_string(), "3.00");
        assert_eq!(at_quarter.to_string(), "0.75");
    }

    #[test]
    fn test_days_overdue_signs() {
        assert_eq!(days_overdue(utc(2024, 1, 10, 0, 0), utc(2024, 1, 7, 0, 0)), -3);
        assert_eq!(days_overdue(utc(2024, 1, 10, 0, 0), utc(2024, 1, 10, 0, 0)), 0);
        assert_eq!(days_overdue(utc(2024, 1, 10, 0, 0), utc(2024, 1, 12, 0, 0)), 2);
    }
}
