//! # Tenant Resolution
//!
//! Per-request tenant identification and lookup:
//!
//! * [`identifier`] derives a candidate tenant ID or slug from headers, host
//!   and path through an ordered chain of pure strategies.
//! * [`normalize`] strips a tenant segment placed in front of a reserved
//!   routing segment before the router sees the request.
//! * [`resolution`] turns an identifier plus an optional user into the
//!   tenant and membership records for the request.
//!
//! None of these fail on unknown input. Absence is handed to the access gate
//! in [`crate::access`], which owns every authorization decision.

pub mod identifier;
pub mod normalize;
pub mod resolution;

pub use identifier::{IdentifierChain, IdentifierSource, RequestTarget, TenantIdentifier};
pub use normalize::{TenantPrefix, TenantPrefixLayer, strip_tenant_prefix};
pub use resolution::{TenantResolution, TenantResolver};

/// Routing segment of the REST surface.
pub const API_SEGMENT: &str = "api";
/// Routing segment of the RPC surface.
pub const RPC_SEGMENT: &str = "rpc";

/// Path segments reserved for system routes such as `api` and `rpc`.
///
/// Shared by identifier extraction and request normalization so both agree on
/// which first segments can never be a tenant slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedSegments(Vec<String>);

impl ReservedSegments {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Exact, case-sensitive match, mirroring how the router matches paths.
    pub fn contains(&self, segment: &str) -> bool {
        self.0.iter().any(|reserved| reserved == segment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ReservedSegments {
    fn default() -> Self {
        Self::new([API_SEGMENT, RPC_SEGMENT])
    }
}

/// Non-empty `/`-separated segments of a path.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
