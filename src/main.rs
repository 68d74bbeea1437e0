//! Chatgate application entry point.
//!
//! Bootstraps the gateway:
//! 1. Load configuration from environment
//! 2. Build the shared outbound HTTP client and session key
//! 3. Build router: API routes + SPA static fallback
//! 4. Apply the access-code gate middleware
//! 5. Start Axum server

use chatgate::{
    auth::{self, middleware::AppState},
    config::Config,
    routes,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!("Starting chatgate on {}", config.bind_addr);
    if config.access_codes.is_empty() {
        tracing::warn!("ACCESS_CODE not set; authentication is disabled");
    }

    // Session signing key (ephemeral if SECRET_KEY is unset)
    let key = auth::session_key(&config);

    // One outbound client for the process lifetime, shared by all
    // forwarding routes
    let http = reqwest::Client::new();

    let config = Arc::new(config);
    let state = AppState {
        http,
        config: config.clone(),
        key,
    };

    // Static fallback: unmatched paths resolve to the SPA entry document so
    // client-side routing keeps working after a hard reload.
    let index = config.static_dir.join("index.html");
    let static_service = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    // Explicit CORS: deny all cross-origin requests (single-origin deployment).
    let cors = CorsLayer::new();

    let app = routes::api_router()
        .fallback_service(static_service)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::access_gate,
        ))
        .layer(axum::extract::DefaultBodyLimit::max(
            config.max_upload_bytes,
        ))
        .layer(cors)
        .with_state(state);

    // Bind to configured address
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
