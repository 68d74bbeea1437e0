//! Signed-cookie session handling.
//!
//! The session carries exactly one field: the access code the client last
//! verified. It lives in a signed cookie, so there is no server-side session
//! store; membership in the configured code set is re-checked on every read.

use crate::config::Config;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

/// Cookie holding the verified access code.
pub const SESSION_COOKIE: &str = "gateway_session";

/// Build the cookie-signing key from configuration.
///
/// Without `SECRET_KEY` an ephemeral key is generated, which invalidates
/// all outstanding sessions on restart.
pub fn session_key(config: &Config) -> Key {
    match &config.secret_key {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            tracing::warn!(
                "SECRET_KEY not set; using an ephemeral signing key. \
                 Sessions will not survive a restart."
            );
            Key::generate()
        }
    }
}

/// Read the access code stored in the session, if any.
pub fn session_code(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Store a verified access code in the session.
pub fn establish_session(jar: SignedCookieJar, code: &str) -> SignedCookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, code.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Drop the session. Safe to call when no session exists.
pub fn clear_session(jar: SignedCookieJar) -> SignedCookieJar {
    // Removal must carry the same path the cookie was set with
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    jar.remove(cookie)
}
