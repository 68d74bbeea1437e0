//! Request filter that gates the forwarding routes behind an access code.

use crate::auth::session;
use crate::config::Config;
use crate::error::AppError;
use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared outbound HTTP client, created once at startup.
    pub http: reqwest::Client,
    pub config: Arc<Config>,
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

/// Path prefixes that require a verified access code.
///
/// Everything else (auth endpoints, static assets, the SPA root) bypasses
/// the gate even when access codes are configured.
pub const PROTECTED_PREFIXES: [&str; 2] = ["/cors/", "/doc-parse/"];

/// Exact paths that require a verified access code.
///
/// `/searxng` is a single route, not a namespace: a prefix match would also
/// swallow unrelated fallback paths like `/searxng-status`.
pub const PROTECTED_ROUTES: [&str; 1] = ["/searxng"];

fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p))
        || PROTECTED_ROUTES.iter().any(|r| path == *r)
}

/// Outcome of the pre-dispatch gate check.
pub enum GateDecision {
    Proceed,
    ShortCircuit(Response),
}

/// Decide whether a request may reach its handler.
///
/// Pure function over (path, session code, configured codes) so the policy
/// is testable without a running server. Membership is checked against the
/// current configuration on every call; nothing is cached.
pub fn evaluate_gate(
    path: &str,
    session_code: Option<&str>,
    access_codes: &[String],
) -> GateDecision {
    if access_codes.is_empty() {
        return GateDecision::Proceed;
    }

    if !is_protected(path) {
        return GateDecision::Proceed;
    }

    match session_code {
        Some(code) if access_codes.iter().any(|c| c == code) => GateDecision::Proceed,
        _ => GateDecision::ShortCircuit(
            AppError::Unauthorized("Not authenticated".to_string()).into_response(),
        ),
    }
}

/// Axum middleware wrapping [`evaluate_gate`].
pub async fn access_gate(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let code = session::session_code(&jar);
    match evaluate_gate(
        request.uri().path(),
        code.as_deref(),
        &state.config.access_codes,
    ) {
        GateDecision::Proceed => next.run(request).await,
        GateDecision::ShortCircuit(response) => {
            tracing::warn!(action = "gate_rejected", path = %request.uri().path(), "Blocked unauthenticated request");
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assert_proceeds(decision: GateDecision) {
        assert!(matches!(decision, GateDecision::Proceed));
    }

    fn assert_rejects(decision: GateDecision) {
        match decision {
            GateDecision::ShortCircuit(response) => {
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
            }
            GateDecision::Proceed => panic!("Expected short-circuit"),
        }
    }

    #[test]
    fn test_empty_code_set_disables_gate() {
        assert_proceeds(evaluate_gate("/cors/proxy", None, &[]));
        assert_proceeds(evaluate_gate("/searxng", None, &[]));
    }

    #[test]
    fn test_unprotected_paths_bypass() {
        let set = codes(&["alpha"]);
        assert_proceeds(evaluate_gate("/api/auth/verify", None, &set));
        assert_proceeds(evaluate_gate("/api/auth/status", None, &set));
        assert_proceeds(evaluate_gate("/", None, &set));
        assert_proceeds(evaluate_gate("/assets/app.js", None, &set));
    }

    #[test]
    fn test_protected_paths_require_valid_code() {
        let set = codes(&["alpha", "beta"]);

        assert_rejects(evaluate_gate("/cors/proxy", None, &set));
        assert_rejects(evaluate_gate("/doc-parse/parse", None, &set));
        assert_rejects(evaluate_gate("/searxng", None, &set));

        assert_proceeds(evaluate_gate("/cors/proxy", Some("alpha"), &set));
        assert_proceeds(evaluate_gate("/searxng", Some("beta"), &set));
    }

    #[test]
    fn test_code_removed_from_config_invalidates_session() {
        // A session established under an old configuration stops working the
        // moment its code is no longer configured
        let set = codes(&["beta"]);
        assert_rejects(evaluate_gate("/cors/proxy", Some("alpha"), &set));
    }

    #[test]
    fn test_searxng_query_string_is_protected() {
        // Prefix match is on the path only; query strings don't matter
        let set = codes(&["alpha"]);
        assert_rejects(evaluate_gate("/searxng", None, &set));
    }

    #[test]
    fn test_searxng_is_gated_by_exact_path_only() {
        // Lookalike fallback paths belong to the SPA, not the forwarder
        let set = codes(&["alpha"]);
        assert_proceeds(evaluate_gate("/searxng-status", None, &set));
        assert_proceeds(evaluate_gate("/searxng/extra", None, &set));
    }
}
