//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{audit, books, borrows, fines, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulo API",
        version = "1.0.0",
        description = "Library Circulation Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Circulo Team", email = "contact@circulo.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Borrows
        borrows::create_borrow,
        borrows::get_borrow,
        borrows::approve_borrow,
        borrows::reject_borrow,
        borrows::return_borrow,
        borrows::renew_borrow,
        borrows::user_borrows,
        borrows::pending_borrows,
        borrows::overdue_borrows,
        borrows::sweep_overdue,
        // Books
        books::book_availability,
        // Audit
        audit::audit_inventory,
        audit::repair_book,
        // Fine configuration
        fines::get_fine_config,
        fines::update_fine_config,
    ),
    components(
        schemas(
            // Borrows
            borrows::CreateBorrowRequest,
            borrows::ApproveBorrowRequest,
            borrows::RejectBorrowRequest,
            borrows::RenewBorrowRequest,
            borrows::SweepResponse,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::OverdueBorrow,
            // Books
            crate::models::book::Book,
            // Audit
            crate::models::audit::Discrepancy,
            crate::models::audit::AuditReport,
            crate::models::audit::RepairOutcome,
            // Fine configuration
            fines::UpdateFineConfigRequest,
            crate::models::fine::FineConfig,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "borrows", description = "Borrow lifecycle"),
        (name = "books", description = "Catalog availability"),
        (name = "audit", description = "Inventory reconciliation"),
        (name = "config", description = "Fine configuration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
