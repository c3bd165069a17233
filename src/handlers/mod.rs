//! # API Handlers
//!
//! HTTP endpoint handlers for the ShipStack API. Procedure handlers exposed
//! under both the RPC and REST surfaces live in [`procedures`].

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::context::RequestContext;
use crate::db;
use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod procedures;
pub mod types;

pub use types::SessionResponse;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Current session, or an empty `401` when the caller is not signed in
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session and user", body = SessionResponse),
        (status = 401, description = "No active session")
    ),
    tag = "session"
)]
pub async fn current_session(context: RequestContext) -> Response {
    match context.session {
        Some(auth) => Json(SessionResponse::from((*auth).clone())).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Readiness probe that checks database connectivity
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Service is ready", body = String),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Readiness check failed");
        ApiError::new(
            ErrorType::ServiceUnavailable.status_code(),
            ErrorType::ServiceUnavailable.error_code(),
            "Database unavailable",
        )
    })?;
    Ok("ready")
}

#[cfg(test)]
mod tests;
