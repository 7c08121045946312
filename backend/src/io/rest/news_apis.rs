//! # REST API for News
//!
//! Members read the latest posts; administrators manage all of them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use shared::{CreateNewsRequest, NewsListResponse};
use tracing::info;

use crate::domain::HOME_NEWS_LIMIT;
use crate::AppState;

pub fn member_router() -> Router<AppState> {
    Router::new().route("/news", get(latest_news))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_news).post(create_news))
        .route("/news/:id", delete(delete_news))
}

/// Newest posts for the home page
pub async fn latest_news(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/news");

    match state.news_service.latest(HOME_NEWS_LIMIT).await {
        Ok(news) => (StatusCode::OK, Json(NewsListResponse { news })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_news(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/news");

    match state.news_service.list_all().await {
        Ok(news) => (StatusCode::OK, Json(NewsListResponse { news })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_news(State(state): State<AppState>, Json(request): Json<CreateNewsRequest>) -> impl IntoResponse {
    info!("POST /api/admin/news - title: {}", request.title);

    match state.news_service.create_post(request).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_news(State(state): State<AppState>, Path(post_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/admin/news/{}", post_id);

    match state.news_service.delete_post(&post_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
