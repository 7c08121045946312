//! # REST API for the Member Dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use tracing::info;

use crate::domain::Caller;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// The caller's own characters with this week's payment counts
pub async fn get_dashboard(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> impl IntoResponse {
    info!("GET /api/dashboard - user: {}", caller.user_id);

    match state.dashboard_service.dashboard(&caller.user_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
