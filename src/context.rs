//! # Request Context
//!
//! Builds the per-request [`RequestContext`]: the session, the tenant and the
//! caller's membership in that tenant. The context middleware never rejects a
//! request on its own; gating happens in [`crate::access`].

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::models::{tenant, tenant_membership};
use crate::server::AppState;
use crate::session::{AUTH_PATH_PREFIX, AuthSession};
use crate::tenant::{RequestTarget, TenantResolution};

/// Everything later stages know about the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session: Option<Arc<AuthSession>>,
    pub tenant: Option<tenant::Model>,
    pub membership: Option<tenant_membership::Model>,
}

impl RequestContext {
    pub fn new(session: Option<AuthSession>, resolution: TenantResolution) -> Self {
        Self {
            session: session.map(Arc::new),
            tenant: resolution.tenant,
            membership: resolution.membership,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_deref().map(AuthSession::user_id)
    }
}

/// Resolves session and tenant and stores the [`RequestContext`] in the
/// request extensions.
///
/// Requests under the auth service's own prefix skip session lookup.
pub async fn context_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let session = if parts.uri.path().starts_with(AUTH_PATH_PREFIX) {
        None
    } else {
        state.sessions.session_for(&parts.headers).await?
    };

    let identified = state.identifiers.extract(&RequestTarget::from_parts(&parts));
    if let Some((source, identifier)) = &identified {
        tracing::debug!(
            source = source.as_str(),
            kind = identifier.kind(),
            identifier = identifier.as_str(),
            "Tenant identifier extracted"
        );
    }

    let user_id = session.as_ref().map(AuthSession::user_id);
    let resolution = state
        .resolver
        .resolve(identified.as_ref().map(|(_, identifier)| identifier), user_id)
        .await?;

    parts
        .extensions
        .insert(RequestContext::new(session, resolution));

    Ok(next.run(Request::from_parts(parts, body)).await)
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| {
                tracing::warn!("Request context missing; treating caller as anonymous");
                RequestContext::default()
            }))
    }
}
