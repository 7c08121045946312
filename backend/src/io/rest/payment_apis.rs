//! # REST API for Weekly Payments
//!
//! Admin endpoints that read, mark and undo a character's payments for the
//! current accounting week.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters/:id/payments", get(get_payments))
        .route("/characters/:id/payments/increment", post(increment_payment))
        .route("/characters/:id/payments/decrement", post(decrement_payment))
}

pub async fn get_payments(State(state): State<AppState>, Path(character_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/admin/characters/{}/payments", character_id);

    match state.character_service.payment_status(&character_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark one payment; 409 once the week is full
pub async fn increment_payment(State(state): State<AppState>, Path(character_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/admin/characters/{}/payments/increment", character_id);

    match state.character_service.increment_payment(&character_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo the newest payment of the week; a no-op when there is none
pub async fn decrement_payment(State(state): State<AppState>, Path(character_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/admin/characters/{}/payments/decrement", character_id);

    match state.character_service.decrement_payment(&character_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => e.into_response(),
    }
}
