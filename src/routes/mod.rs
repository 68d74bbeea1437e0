//! API route handlers.

pub mod auth;
pub mod parse;
pub mod proxy;
pub mod search;

use crate::auth::middleware::AppState;
use axum::{routing::get, routing::post, Router};

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Forwarding endpoints (gated when access codes are configured)
        .route("/cors/proxy", post(proxy::forward))
        .route("/doc-parse/parse", post(parse::parse_document))
        .route("/searxng", get(search::forward))
        // Auth endpoints (always reachable)
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/logout", post(auth::logout))
}
