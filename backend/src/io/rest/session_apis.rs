//! # REST API for Sessions
//!
//! Sign-out only; sessions are created by the identity service.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect},
    routing::post,
    Router,
};
use tracing::info;

use crate::io::rest::auth_middleware::session_token;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/signout", post(sign_out))
}

/// Revoke the caller's session and send them home
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    info!("POST /api/auth/signout");

    let token = session_token(&headers);
    match state.gate.sign_out(token.as_deref()).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => e.into_response(),
    }
}
