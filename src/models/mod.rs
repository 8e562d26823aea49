//! Data models for Circulo

pub mod audit;
pub mod book;
pub mod borrow;
pub mod fine;
pub mod user;

// Re-export commonly used types
pub use audit::{AuditReport, Discrepancy, RepairOutcome};
pub use book::Book;
pub use borrow::{BorrowRecord, BorrowStatus, OverdueBorrow, TransitionEffects};
pub use fine::FineConfig;
pub use user::UserStatus;
