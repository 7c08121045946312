//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use shared::ErrorResponse;
use tracing::error;

use crate::domain::PortalError;

/// Where unauthenticated callers are sent
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in callers without admin rights are sent
pub const DASHBOARD_PATH: &str = "/dashboard";

impl PortalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Forbidden => StatusCode::SEE_OTHER,
            Self::LimitExceeded { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            Self::Forbidden => Redirect::to(DASHBOARD_PATH).into_response(),
            Self::Store(_) | Self::Internal(_) => {
                // Store details stay in the log
                error!("Request failed: {:?}", self);
                let body = ErrorResponse {
                    error: "Internal server error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            other => {
                let body = ErrorResponse {
                    error: other.to_string(),
                };
                (other.status_code(), Json(body)).into_response()
            }
        }
    }
}
