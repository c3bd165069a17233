//! # Tests for Handlers
//!
//! Unit tests calling handlers directly with hand-built extractors.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Duration, Utc};

use crate::config::AppConfig;
use crate::context::RequestContext;
use crate::handlers::{current_session, readyz, root};
use crate::server::AppState;
use crate::session::AuthSession;
use crate::test_support::{TEST_SECRET, setup_test_db};

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        auth_secret: Some(TEST_SECRET.to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.status, "ok");
    assert_eq!(service_info.service, "ShipStack API");
    assert!(chrono::DateTime::parse_from_rfc3339(&service_info.timestamp).is_ok());
}

#[tokio::test]
async fn test_session_handler_without_session_is_empty_401() {
    let response = current_session(RequestContext::default()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_session_handler_returns_session_and_user() {
    let db = setup_test_db().await;
    let user = db.seed_user("u1").await;
    let session = db
        .seed_session("s1", "tok-1", "u1", Utc::now() + Duration::hours(1))
        .await;

    let context = RequestContext {
        session: Some(Arc::new(AuthSession { session, user })),
        ..Default::default()
    };
    let response = current_session(context).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["user"]["id"], "u1");
    assert_eq!(json["user"]["emailVerified"], true);
    assert_eq!(json["session"]["userId"], "u1");
    assert!(json["session"].get("token").is_none());
}

#[tokio::test]
async fn test_readyz_reports_ready_with_live_database() {
    let db = setup_test_db().await;
    let state = AppState::new(test_config(), db.conn.as_ref().clone()).unwrap();

    let result = readyz(State(state)).await;
    assert_eq!(result.unwrap(), "ready");
}

#[tokio::test]
async fn test_readyz_reports_unavailable_without_database() {
    let state = AppState::new(test_config(), sea_orm::DatabaseConnection::default()).unwrap();

    let err = readyz(State(state)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}
