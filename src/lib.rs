//! Circulo Library Circulation Service
//!
//! The borrow lifecycle and inventory-consistency core of a library system:
//! authoritative copy counts, borrow-record status transitions, overdue
//! fines, and the standing audit that keeps ledger and records in agreement.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
