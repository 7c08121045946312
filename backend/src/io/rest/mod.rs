//! # REST API Interface Layer
//!
//! HTTP endpoints of the portal, all nested under `/api`.
//! This layer handles:
//! - JSON request/response serialization
//! - The authorization gate, applied as route middleware
//! - Translation of domain errors to HTTP responses
//!
//! Handlers hold no business rules; they resolve the caller (via the
//! middleware), call one domain service and map the outcome.

pub mod auth_middleware;
pub mod character_apis;
pub mod dashboard_apis;
pub mod error;
pub mod news_apis;
pub mod payment_apis;
pub mod session_apis;
pub mod user_apis;

#[cfg(test)]
pub mod test_support;
