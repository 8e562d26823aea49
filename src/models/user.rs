//! Library user account standing

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account standing as reported by the user directory.
/// Only `Approved` accounts may borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Approved => "APPROVED",
            UserStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", label)
    }
}
