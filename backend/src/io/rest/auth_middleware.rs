//! Authorization gate middleware.
//!
//! Runs ahead of every protected route, resolves the caller through the
//! domain gate and hands it to handlers as an `Extension<Caller>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;

/// Cookie carrying the session token for browser clients
pub const SESSION_COOKIE: &str = "portal_session";

/// Session token from `Authorization: Bearer` or the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Let any signed-in member through
pub async fn require_member(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = session_token(request.headers());
    match state.gate.authenticate(token.as_deref()).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Let only administrators through
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = session_token(request.headers());
    match state.gate.require_admin(token.as_deref()).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
