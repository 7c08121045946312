//! # REST API for Character Management
//!
//! Admin endpoints for characters and their event points.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::{CharacterFilter, CharacterListResponse, CharacterRequest};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters", get(list_characters).post(create_character))
        .route(
            "/characters/:id",
            get(get_character).put(update_character).delete(delete_character),
        )
        .route("/characters/:id/event-points/increment", post(increment_event_points))
        .route("/characters/:id/event-points/decrement", post(decrement_event_points))
}

/// List characters; supports `owner`, `name` and `level` query filters
pub async fn list_characters(State(state): State<AppState>, Query(filter): Query<CharacterFilter>) -> impl IntoResponse {
    info!("GET /api/admin/characters - filter: {:?}", filter);

    match state.character_service.list_characters(filter).await {
        Ok(characters) => (StatusCode::OK, Json(CharacterListResponse { characters })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_character(State(state): State<AppState>, Path(character_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/admin/characters/{}", character_id);

    match state.character_service.get_character(&character_id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_character(
    State(state): State<AppState>,
    Json(request): Json<CharacterRequest>,
) -> impl IntoResponse {
    info!("POST /api/admin/characters - request: {:?}", request);

    match state.character_service.create_character(request).await {
        Ok(character) => (StatusCode::CREATED, Json(character)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_character(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
    Json(request): Json<CharacterRequest>,
) -> impl IntoResponse {
    info!("PUT /api/admin/characters/{} - request: {:?}", character_id, request);

    match state.character_service.update_character(&character_id, request).await {
        Ok(character) => (StatusCode::OK, Json(character)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_character(State(state): State<AppState>, Path(character_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/admin/characters/{}", character_id);

    match state.character_service.delete_character(&character_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn increment_event_points(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/admin/characters/{}/event-points/increment", character_id);

    match state.character_service.increment_event_points(&character_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn decrement_event_points(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/admin/characters/{}/event-points/decrement", character_id);

    match state.character_service.decrement_event_points(&character_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
