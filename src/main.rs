//! Circulo Server - Library Circulation Service

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulo_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("circulo_server={},tower_http=debug", config.logging.level).into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Circulo Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Arc::new(Services::new(repository, config.circulation.clone()));

    // Standing inventory audit
    if config.audit.enabled {
        let audit = services.reconciliation.clone();
        let every = Duration::from_secs(config.audit.interval_secs);
        tokio::spawn(audit.run_periodic(every));
        tracing::info!(interval_secs = config.audit.interval_secs, "inventory audit scheduled");
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Borrow lifecycle
        .route("/borrows", post(api::borrows::create_borrow))
        .route("/borrows/pending", get(api::borrows::pending_borrows))
        .route("/borrows/overdue", get(api::borrows::overdue_borrows))
        .route("/borrows/overdue/sweep", post(api::borrows::sweep_overdue))
        .route("/borrows/:id", get(api::borrows::get_borrow))
        .route("/borrows/:id/approve", post(api::borrows::approve_borrow))
        .route("/borrows/:id/reject", post(api::borrows::reject_borrow))
        .route("/borrows/:id/return", post(api::borrows::return_borrow))
        .route("/borrows/:id/renew", post(api::borrows::renew_borrow))
        .route("/users/:id/borrows", get(api::borrows::user_borrows))
        // Catalog availability
        .route("/books/:id/availability", get(api::books::book_availability))
        // Inventory reconciliation
        .route("/audit/inventory", get(api::audit::audit_inventory))
        .route("/audit/inventory/:book_id/repair", post(api::audit::repair_book))
        // Fine configuration
        .route("/config/fines", get(api::fines::get_fine_config))
        .route("/config/fines", put(api::fines::update_fine_config))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
