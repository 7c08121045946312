//! # Portal Backend
//!
//! Server side of the role-play portal: member profiles, characters, weekly
//! payment tallies, event points and news.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, authorization middleware)
//!     ↓
//! Domain Layer (payment ledger, authorization gate, services)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! Identity issuance lives in an external service that writes session rows;
//! this crate resolves callers from those sessions on every request.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    middleware, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domain::{
    AuthorizationGate, CharacterService, Clock, DashboardService, NewsService, PaymentLedger, SystemClock,
    UserService,
};
use crate::io::rest::{
    auth_middleware, character_apis, dashboard_apis, news_apis, payment_apis, session_apis, user_apis,
};
use crate::storage::{
    CharacterRepository, DbConnection, NewsRepository, PaymentRepository, ProfileRepository, SessionRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub gate: AuthorizationGate,
    pub character_service: CharacterService,
    pub user_service: UserService,
    pub news_service: NewsService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Wire repositories and services over an open database
    pub fn new(db: DbConnection, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let profiles = ProfileRepository::new(db.clone());
        let characters = CharacterRepository::new(db.clone());
        let payments = PaymentRepository::new(db.clone(), config.atomic_procedures);

        let ledger = PaymentLedger::new(Arc::new(payments), clock.clone(), config.week_offset()?);
        let character_service =
            CharacterService::new(characters.clone(), profiles.clone(), ledger, clock.clone());

        Ok(Self {
            gate: AuthorizationGate::new(SessionRepository::new(db.clone()), profiles.clone()),
            dashboard_service: DashboardService::new(characters, character_service.clone()),
            character_service,
            user_service: UserService::new(profiles, clock.clone(), config.user_email_domain.clone()),
            news_service: NewsService::new(NewsRepository::new(db), clock),
        })
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    if !config.atomic_procedures {
        info!("Atomic payment procedures disabled, ledger will use the fallback path");
    }

    info!("Setting up domain services");
    AppState::new(db, config, Arc::new(SystemClock))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    // Signed-in members
    let member_routes = Router::new()
        .merge(news_apis::member_router())
        .merge(dashboard_apis::router())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware::require_member,
        ));

    // Administrators
    let admin_routes = Router::new()
        .merge(user_apis::router())
        .merge(character_apis::router())
        .merge(payment_apis::router())
        .merge(news_apis::admin_router())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware::require_admin,
        ));

    let api_routes = Router::new()
        .merge(session_apis::router())
        .merge(member_routes)
        .nest("/admin", admin_routes);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
