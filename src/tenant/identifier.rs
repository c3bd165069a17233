//! Tenant identifier extraction.
//!
//! An [`IdentifierChain`] runs its strategies in order and the first one that
//! yields a value wins. Every value is trimmed and lower-cased; empty values
//! count as absent. Finding nothing is not an error.

use std::net::IpAddr;

use axum::{
    extract::OriginalUri,
    http::{HeaderMap, HeaderName, header::HOST, request::Parts},
};

use super::{API_SEGMENT, ReservedSegments, path_segments};
use crate::config::{ConfigError, TenancyConfig};

/// A candidate tenant reference: an explicit ID or a slug, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TenantIdentifier {
    Id(String),
    Slug(String),
}

impl TenantIdentifier {
    pub fn as_str(&self) -> &str {
        match self {
            TenantIdentifier::Id(value) | TenantIdentifier::Slug(value) => value,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TenantIdentifier::Id(_) => "id",
            TenantIdentifier::Slug(_) => "slug",
        }
    }
}

/// Where in the request an identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource {
    IdHeader,
    SlugHeader,
    Subdomain,
    PathSegment,
}

impl IdentifierSource {
    /// Priority order used by [`IdentifierChain::new`].
    pub const DEFAULT_ORDER: [IdentifierSource; 4] = [
        IdentifierSource::IdHeader,
        IdentifierSource::SlugHeader,
        IdentifierSource::Subdomain,
        IdentifierSource::PathSegment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierSource::IdHeader => "id_header",
            IdentifierSource::SlugHeader => "slug_header",
            IdentifierSource::Subdomain => "subdomain",
            IdentifierSource::PathSegment => "path",
        }
    }
}

/// The parts of a request that tenant identification looks at.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub headers: &'a HeaderMap,
    pub host: Option<&'a str>,
    pub path: &'a str,
}

impl<'a> RequestTarget<'a> {
    pub fn new(headers: &'a HeaderMap, host: Option<&'a str>, path: &'a str) -> Self {
        Self {
            headers,
            host,
            path,
        }
    }

    /// Builds a target from request parts.
    ///
    /// The path comes from the pre-normalization URI when one was recorded,
    /// and the host from the `Host` header, falling back to the URI authority.
    pub fn from_parts(parts: &'a Parts) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);

        let host = parts
            .headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| uri.authority().map(|authority| authority.as_str()));

        Self {
            headers: &parts.headers,
            host,
            path: uri.path(),
        }
    }
}

/// Ordered list of identifier strategies.
#[derive(Debug, Clone)]
pub struct IdentifierChain {
    id_header: HeaderName,
    slug_header: HeaderName,
    reserved: ReservedSegments,
    order: Vec<IdentifierSource>,
}

impl IdentifierChain {
    /// Chain with the default priority: ID header, slug header, subdomain, path.
    pub fn new(config: &TenancyConfig) -> Result<Self, ConfigError> {
        let header = |value: &String| {
            HeaderName::from_bytes(value.as_bytes()).map_err(|_| ConfigError::InvalidTenantHeader {
                value: value.clone(),
            })
        };

        Ok(Self {
            id_header: header(&config.id_header)?,
            slug_header: header(&config.slug_header)?,
            reserved: ReservedSegments::new(config.reserved_segments.iter().cloned()),
            order: IdentifierSource::DEFAULT_ORDER.to_vec(),
        })
    }

    /// Replaces the strategy order.
    pub fn with_order(mut self, order: impl IntoIterator<Item = IdentifierSource>) -> Self {
        self.order = order.into_iter().collect();
        self
    }

    pub fn reserved_segments(&self) -> &ReservedSegments {
        &self.reserved
    }

    /// Runs the strategies in order, returning the first identifier found.
    pub fn extract(&self, target: &RequestTarget<'_>) -> Option<(IdentifierSource, TenantIdentifier)> {
        self.order
            .iter()
            .find_map(|source| self.apply(*source, target).map(|identifier| (*source, identifier)))
    }

    /// Same as [`extract`](Self::extract) without the source.
    pub fn identify(&self, target: &RequestTarget<'_>) -> Option<TenantIdentifier> {
        self.extract(target).map(|(_, identifier)| identifier)
    }

    fn apply(&self, source: IdentifierSource, target: &RequestTarget<'_>) -> Option<TenantIdentifier> {
        match source {
            IdentifierSource::IdHeader => {
                header_value(target.headers, &self.id_header).map(TenantIdentifier::Id)
            }
            IdentifierSource::SlugHeader => {
                header_value(target.headers, &self.slug_header).map(TenantIdentifier::Slug)
            }
            IdentifierSource::Subdomain => {
                target.host.and_then(subdomain_slug).map(TenantIdentifier::Slug)
            }
            IdentifierSource::PathSegment => {
                path_slug(target.path, &self.reserved).map(TenantIdentifier::Slug)
            }
        }
    }
}

/// Trims and lower-cases a raw value; empty means absent.
pub fn normalize_identifier(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    normalize_identifier(headers.get(name).and_then(|value| value.to_str().ok()))
}

/// Leading DNS label of a host with at least three labels.
///
/// `localhost`, `*.localhost`, IP literals and a leading `www` never yield a
/// slug. A port and a trailing root dot are ignored.
pub fn subdomain_slug(host: &str) -> Option<String> {
    let host = host.trim().to_lowercase();

    // Bracketed IPv6 literal, with or without port.
    if host.starts_with('[') {
        return None;
    }

    let hostname = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        Some(_) => return None,
        None => host.as_str(),
    };
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);

    if hostname == "localhost" || hostname.ends_with(".localhost") {
        return None;
    }

    if hostname.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 3 {
        return None;
    }

    match labels[0] {
        "" | "www" => None,
        candidate => Some(candidate.to_string()),
    }
}

/// First path segment, unless it is reserved or the REST segment follows it.
///
/// `/acme/rpc/...` still names `acme`; `/acme/api/...` does not.
pub fn path_slug(path: &str, reserved: &ReservedSegments) -> Option<String> {
    let mut segments = path_segments(path);
    let candidate = segments.next()?;

    if reserved.contains(candidate) {
        return None;
    }

    if segments.next() == Some(API_SEGMENT) {
        return None;
    }

    Some(candidate.to_lowercase())
}
