//! Allow-listed CORS-bypass proxy.

use crate::auth::middleware::AppState;
use crate::error::AppError;
use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Body of a proxied request, resolved at the deserialization boundary.
///
/// JSON objects and arrays are forwarded as structured JSON payloads;
/// everything else (strings, numbers, booleans) is forwarded verbatim.
#[derive(Debug, PartialEq)]
pub enum ProxyBody {
    Structured(serde_json::Value),
    Raw(String),
}

impl<'de> Deserialize<'de> for ProxyBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            v @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)) => {
                ProxyBody::Structured(v)
            }
            serde_json::Value::String(s) => ProxyBody::Raw(s),
            other => ProxyBody::Raw(other.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<ProxyBody>,
}

/// Check a target URL against the configured prefix allow-list.
pub fn is_allowed(url: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| url.starts_with(prefix))
}

/// POST /cors/proxy — Forward a request to an allow-listed URL
///
/// Returns the upstream's status and raw body unchanged. One outbound call,
/// no retry; transport failures surface as 500 with the failure description.
pub async fn forward(
    State(state): State<AppState>,
    Json(req): Json<ProxyRequest>,
) -> Result<Response, AppError> {
    if !is_allowed(&req.url, &state.config.allowed_proxy_prefixes) {
        tracing::warn!(action = "proxy_rejected", url = %req.url, "Target URL not allow-listed");
        return Err(AppError::Forbidden("URL not allowed".to_string()));
    }

    let method = Method::from_bytes(req.method.to_uppercase().as_bytes())
        .map_err(|_| AppError::BadRequest(format!("Invalid method: {}", req.method)))?;

    let mut outbound = state.http.request(method, &req.url);

    if let Some(headers) = &req.headers {
        for (name, value) in headers {
            outbound = outbound.header(name.as_str(), value.as_str());
        }
    }

    match req.body {
        Some(ProxyBody::Structured(value)) => outbound = outbound.json(&value),
        Some(ProxyBody::Raw(text)) => outbound = outbound.body(text),
        None => {}
    }

    let response = outbound.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    tracing::debug!(action = "proxy_forwarded", url = %req.url, status = %status, "Forwarded proxy request");

    Ok((status, bytes).into_response())
}
