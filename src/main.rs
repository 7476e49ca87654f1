use axum::{Router, routing::get};
use hisaab::api::handlers::{AppState, api_routes};
use hisaab::config::CONFIG;
use hisaab::{HisaabService, InMemoryMembership, InMemoryNotifier, InMemoryStorage};
use http::header;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter(CONFIG.log_level.as_str()).init();

    // Wire the service with in-memory backends
    let storage = InMemoryStorage::new();
    let membership = InMemoryMembership::new();
    let notifier = InMemoryNotifier::new();
    let service = Arc::new(HisaabService::new(storage, membership, notifier));
    let state = AppState { service };

    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { "OK" }))
        .merge(api_routes(state))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
