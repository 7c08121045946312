//! # REST API for User Management
//!
//! Admin endpoints for member profiles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use shared::{CreateUserRequest, UpdateUserRequest, UserListResponse};
use tracing::info;

use crate::domain::Caller;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/options", get(list_user_options))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/users");

    match state.user_service.list_users().await {
        Ok(users) => (StatusCode::OK, Json(UserListResponse { users })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// ID and name pairs for owner selects
pub async fn list_user_options(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/users/options");

    match state.user_service.list_options().await {
        Ok(options) => (StatusCode::OK, Json(options)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/admin/users/{}", user_id);

    match state.user_service.get_user(&user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_user(State(state): State<AppState>, Json(request): Json<CreateUserRequest>) -> impl IntoResponse {
    info!("POST /api/admin/users - request: {:?}", request);

    match state.user_service.create_user(request).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/admin/users/{} - request: {:?}", user_id, request);

    match state.user_service.update_user(&user_id, request).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/users/{}", user_id);

    match state.user_service.delete_user(&caller.user_id, &user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
