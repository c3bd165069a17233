//! # Data Models
//!
//! SeaORM entities read by the API plus small shared response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod session;
pub mod tenant;
pub mod tenant_membership;
pub mod user;

pub use session::Entity as Session;
pub use tenant::Entity as Tenant;
pub use tenant_membership::{Entity as TenantMembership, TenantRole};
pub use user::Entity as User;

/// Liveness response returned by the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// Always `ok` when the process is serving
    #[schema(example = "ok")]
    pub status: String,
    /// The name of the service
    #[schema(example = "ShipStack API")]
    pub service: String,
    /// Server time (RFC 3339)
    pub timestamp: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: "ShipStack API".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
