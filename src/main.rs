use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oxisearch::common::config::AppConfig;
use oxisearch::common::di::AppServiceFactory;
use oxisearch::interfaces::create_api_routes;

/// OxiSearch - Search gateway for folders and documents
///
/// Normalizes search configurations coming from shareable links or JSON
/// bodies, adapts them to the backend's basic, advanced and unified search
/// endpoints and keeps a small per-installation search history.
///
/// The architecture follows the Clean/Hexagonal Architecture pattern with:
///
/// - Domain Layer: search configuration model and local ranking (domain/*)
/// - Application Layer: codec, request adapter, coordinator and use cases (application/*)
/// - Infrastructure Layer: HTTP backend client and key-value stores (infrastructure/*)
/// - Interface Layer: API endpoints (interfaces/*)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = AppConfig::from_env();
    let addr = config.server.bind_addr;

    tracing::info!("Search backend at {}", config.backend.base_url);
    match &config.history.data_dir {
        Some(dir) => tracing::info!("Search history stored under {}", dir.display()),
        None => tracing::warn!("No data directory configured, search history is disabled"),
    }

    let app_state = AppServiceFactory::new(config).create_app_state().await?;

    let app = Router::new()
        .nest("/api", create_api_routes(app_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting OxiSearch server on http://{}", addr);

    axum::serve(listener, app).await?;

    tracing::info!("Server shutdown completed");

    Ok(())
}
