//! GET forwarder for the configured SearXNG instance.

use crate::auth::middleware::AppState;
use crate::error::AppError;
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

/// Build the upstream URL from the configured base and the inbound query string.
pub fn target_url(base: &str, query: Option<&str>) -> String {
    match query {
        Some(qs) if !qs.is_empty() => format!("{}?{}", base, qs),
        _ => base.to_string(),
    }
}

/// GET /searxng — Forward the query string and headers to the search instance
///
/// Misconfiguration (no `SEARXNG_URL`) is reported as 502 before any network
/// attempt; transport failures as 500. The `Host` header is dropped so the
/// upstream's own virtual hosting applies.
pub async fn forward(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let base = state
        .config
        .searxng_url
        .as_deref()
        .ok_or_else(|| AppError::BadGateway("SEARXNG_URL not configured".to_string()))?;

    let url = target_url(base, query.as_deref());

    let mut outbound = state.http.get(&url);
    for (name, value) in headers.iter() {
        if name == header::HOST {
            continue;
        }
        outbound = outbound.header(name, value);
    }

    let response = outbound.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    tracing::debug!(action = "search_forwarded", status = %status, "Forwarded search request");

    Ok((status, bytes).into_response())
}
