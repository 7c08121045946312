//! Router harness shared by the REST API tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::LOCATION, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::util::ServiceExt;

use crate::config::{Config, ATOMIC_PROCEDURES_VAR};
use crate::domain::clock::ManualClock;
use crate::storage::test_utils::{seed_profile, seed_session};
use crate::storage::DbConnection;
use crate::{create_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub db: DbConnection,
    pub clock: Arc<ManualClock>,
    pub admin_id: String,
    pub admin_token: String,
    pub member_id: String,
    pub member_token: String,
}

/// Outcome of one request: status, redirect target and JSON body (Null when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub json: Value,
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(true).await
}

/// Build the full router over a fresh database with one admin and one member signed in
pub async fn setup_test_app_with(atomic_procedures: bool) -> TestApp {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    let atomic = atomic_procedures.to_string();
    let config = Config::from_lookup(|key| (key == ATOMIC_PROCEDURES_VAR).then(|| atomic.clone()))
        .expect("Failed to load test config");

    // Wednesday, mid accounting week
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap()));
    let state = AppState::new(db.clone(), &config, clock.clone()).expect("Failed to build app state");
    let router = create_router(state, &config).expect("Failed to build router");

    let admin_id = seed_profile(&db, "Admin", true).await;
    let admin_token = seed_session(&db, &admin_id).await;
    let member_id = seed_profile(&db, "Member", false).await;
    let member_token = seed_session(&db, &member_id).await;

    TestApp {
        router,
        db,
        clock,
        admin_id,
        admin_token,
        member_id,
        member_token,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, location, json }
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(method, uri, Some(&self.admin_token), body).await
    }

    pub async fn as_member(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(method, uri, Some(&self.member_token), body).await
    }
}
