//! # API Response Types
//!
//! Wire shapes for session, user, tenant and membership data. Field names are
//! camelCase and timestamps RFC 3339 strings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{TenantRole, session, tenant, tenant_membership, user};
use crate::session::AuthSession;

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            email_verified: model.email_verified,
            image: model.image,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Session metadata; the token itself is never returned
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub user_id: String,
    pub expires_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<session::Model> for SessionInfo {
    fn from(model: session::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            expires_at: model.expires_at.to_rfc3339(),
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Current session and its user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub session: SessionInfo,
    pub user: UserInfo,
}

impl From<AuthSession> for SessionResponse {
    fn from(auth: AuthSession) -> Self {
        Self {
            session: auth.session.into(),
            user: auth.user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub id: String,
    #[schema(example = "acme")]
    pub slug: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<tenant::Model> for TenantInfo {
    fn from(model: tenant::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            name: model.name,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipInfo {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub role: TenantRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<tenant_membership::Model> for MembershipInfo {
    fn from(model: tenant_membership::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            user_id: model.user_id,
            role: model.role,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Payload of the tenant-scoped `privateData` procedure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDataResponse {
    #[schema(example = "This is private")]
    pub message: String,
    pub user: UserInfo,
    pub tenant: TenantInfo,
    pub tenant_membership: MembershipInfo,
}
