//! # Access Gate
//!
//! Procedures declare an [`AccessTier`]. Each tier is an ordered list of
//! checks over the [`RequestContext`]; the first failing check decides the
//! rejection. A tenant-scoped procedure therefore answers an anonymous caller
//! with `401` even when no tenant was identified.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use metrics::counter;
use thiserror::Error;

use crate::context::RequestContext;
use crate::error::{ApiError, bad_request, forbidden, unauthorized};
use crate::models::{tenant, tenant_membership};
use crate::session::AuthSession;

/// Reasons a gated procedure is refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Tenant is required")]
    TenantRequired,
    #[error("You are not a member of this tenant")]
    NotAMember,
}

impl AccessDenied {
    fn reason(&self) -> &'static str {
        match self {
            AccessDenied::Unauthenticated => "unauthenticated",
            AccessDenied::TenantRequired => "tenant_required",
            AccessDenied::NotAMember => "not_a_member",
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        let message = denied.to_string();
        match denied {
            AccessDenied::Unauthenticated => unauthorized(Some(&message)),
            AccessDenied::TenantRequired => bad_request(&message),
            AccessDenied::NotAMember => forbidden(Some(&message)),
        }
    }
}

/// A single gate condition.
pub type AccessCheck = fn(&RequestContext) -> Result<(), AccessDenied>;

pub fn require_session(context: &RequestContext) -> Result<(), AccessDenied> {
    match context.session {
        Some(_) => Ok(()),
        None => Err(AccessDenied::Unauthenticated),
    }
}

pub fn require_tenant(context: &RequestContext) -> Result<(), AccessDenied> {
    match context.tenant {
        Some(_) => Ok(()),
        None => Err(AccessDenied::TenantRequired),
    }
}

pub fn require_membership(context: &RequestContext) -> Result<(), AccessDenied> {
    let is_member = match (&context.membership, &context.tenant, context.user_id()) {
        (Some(membership), Some(tenant), Some(user_id)) => {
            membership.tenant_id == tenant.id && membership.user_id == user_id
        }
        _ => false,
    };

    if is_member {
        Ok(())
    } else {
        Err(AccessDenied::NotAMember)
    }
}

const AUTHENTICATED_CHECKS: &[AccessCheck] = &[require_session];
const TENANT_SCOPED_CHECKS: &[AccessCheck] = &[require_session, require_tenant, require_membership];

/// Access level a procedure requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    Public,
    Authenticated,
    TenantScoped,
}

impl AccessTier {
    pub fn checks(&self) -> &'static [AccessCheck] {
        match self {
            AccessTier::Public => &[],
            AccessTier::Authenticated => AUTHENTICATED_CHECKS,
            AccessTier::TenantScoped => TENANT_SCOPED_CHECKS,
        }
    }

    /// Runs the tier's checks in order, stopping at the first failure.
    pub fn authorize(&self, context: &RequestContext) -> Result<(), AccessDenied> {
        self.checks().iter().try_for_each(|check| check(context))
    }
}

/// Middleware enforcing an [`AccessTier`] on the routes it wraps.
///
/// Install with `middleware::from_fn_with_state(tier, access_gate)` inside the
/// context middleware.
pub async fn access_gate(
    State(tier): State<AccessTier>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let denied = match request.extensions().get::<RequestContext>() {
        Some(context) => tier.authorize(context).err(),
        None => tier.authorize(&RequestContext::default()).err(),
    };

    if let Some(denied) = denied {
        counter!("access_denied_total", "reason" => denied.reason()).increment(1);
        tracing::info!(
            tier = ?tier,
            path = %request.uri().path(),
            reason = denied.reason(),
            "Access denied"
        );
        return Err(denied.into());
    }

    Ok(next.run(request).await)
}

/// Extractor for a signed-in caller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Arc<AuthSession>);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;
        AccessTier::Authenticated.authorize(&context)?;
        context
            .session
            .map(Authenticated)
            .ok_or_else(|| AccessDenied::Unauthenticated.into())
    }
}

/// Extractor for a caller who is a member of the resolved tenant.
#[derive(Debug, Clone)]
pub struct TenantMember {
    pub session: Arc<AuthSession>,
    pub tenant: tenant::Model,
    pub membership: tenant_membership::Model,
}

impl<S> FromRequestParts<S> for TenantMember
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;
        AccessTier::TenantScoped.authorize(&context)?;

        match (context.session, context.tenant, context.membership) {
            (Some(session), Some(tenant), Some(membership)) => Ok(TenantMember {
                session,
                tenant,
                membership,
            }),
            _ => Err(AccessDenied::NotAMember.into()),
        }
    }
}
