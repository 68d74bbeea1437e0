//! Access-code endpoints: verify, status, logout.

use crate::auth::middleware::AppState;
use crate::auth::session;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// POST /api/auth/verify — Check an access code and establish a session
pub async fn verify(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(req): Json<VerifyRequest>,
) -> Response {
    // No codes configured: authentication is disabled, nothing to record
    if state.config.access_codes.is_empty() {
        return Json(json!({"status": "success"})).into_response();
    }

    if state.config.access_codes.iter().any(|c| c == &req.code) {
        tracing::info!(action = "access_verified", "Access code accepted");
        let jar = session::establish_session(jar, &req.code);
        (jar, Json(json!({"status": "success"}))).into_response()
    } else {
        tracing::warn!(action = "access_rejected", "Invalid access code");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "Invalid access code"})),
        )
            .into_response()
    }
}

/// GET /api/auth/status — Report whether the current session is authenticated
///
/// The stored code is re-checked against configuration on every call, so a
/// code removed from `ACCESS_CODE` invalidates outstanding sessions
/// immediately.
pub async fn status(State(state): State<AppState>, jar: SignedCookieJar) -> Json<serde_json::Value> {
    let authenticated = state.config.access_codes.is_empty()
        || session::session_code(&jar)
            .map(|code| state.config.access_codes.iter().any(|c| c == &code))
            .unwrap_or(false);

    Json(json!({"authenticated": authenticated}))
}

/// POST /api/auth/logout — Drop the session. Idempotent.
pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    let jar = session::clear_session(jar);
    (jar, Json(json!({"status": "success"})))
}
