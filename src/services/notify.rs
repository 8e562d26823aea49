//! Notification collaborator
//!
//! Delivery is best effort. A failed notification is logged and never rolls
//! back the lifecycle transition that produced it.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{error::AppResult, models::borrow::BorrowRecord};

/// Lifecycle events fanned out to the notification collaborator.
#[derive(Debug, Clone)]
pub enum BorrowEvent {
    Requested(BorrowRecord),
    Approved(BorrowRecord),
    Rejected(BorrowRecord),
    Returned(BorrowRecord),
    Renewed(BorrowRecord),
    Overdue {
        record: BorrowRecord,
        days_overdue: i64,
    },
}

impl BorrowEvent {
    pub fn record(&self) -> &BorrowRecord {
        match self {
            BorrowEvent::Requested(r)
            | BorrowEvent::Approved(r)
            | BorrowEvent::Rejected(r)
            | BorrowEvent::Returned(r)
            | BorrowEvent::Renewed(r) => r,
            BorrowEvent::Overdue { record, .. } => record,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BorrowEvent::Requested(_) => "requested",
            BorrowEvent::Approved(_) => "approved",
            BorrowEvent::Rejected(_) => "rejected",
            BorrowEvent::Returned(_) => "returned",
            BorrowEvent::Renewed(_) => "renewed",
            BorrowEvent::Overdue { .. } => "overdue",
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &BorrowEvent) -> AppResult<()>;
}

/// Default notifier: structured log lines only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, event: &BorrowEvent) -> AppResult<()> {
        let record = event.record();
        tracing::info!(
            event = event.kind(),
            record_id = record.id,
            user_id = record.user_id,
            book_id = record.book_id,
            "borrow event"
        );
        Ok(())
    }
}
