//! Tenant prefix normalization.
//!
//! `/acme/api/widgets` and `/api/widgets` must reach the same route. The
//! [`TenantPrefixLayer`] wraps the whole router and drops a leading tenant
//! segment whenever the segment after it is reserved. The pre-rewrite URI is
//! kept as [`OriginalUri`] so tenant extraction still sees the slug.

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::OriginalUri,
    http::{Request, Uri, uri::PathAndQuery},
};
use tower::{Layer, Service};

use super::{ReservedSegments, path_segments};

/// Drops a leading tenant segment from the request path when the next segment
/// is reserved. Method, headers, query and body are left untouched.
///
/// Idempotent: a rewritten path starts with a reserved segment and is never
/// rewritten again.
pub fn strip_tenant_prefix<B>(mut request: Request<B>, reserved: &ReservedSegments) -> Request<B> {
    let Some(path) = stripped_path(request.uri().path(), reserved) else {
        return request;
    };

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let Ok(path_and_query) = path_and_query.parse::<PathAndQuery>() else {
        tracing::warn!(path = %request.uri().path(), "Could not rebuild normalized request path");
        return request;
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    let Ok(uri) = Uri::from_parts(parts) else {
        return request;
    };

    tracing::debug!(from = %request.uri(), to = %uri, "Stripped tenant path prefix");

    if request.extensions().get::<OriginalUri>().is_none() {
        let original = request.uri().clone();
        request.extensions_mut().insert(OriginalUri(original));
    }
    *request.uri_mut() = uri;
    request
}

/// Rewritten path, or `None` when no rewrite applies.
fn stripped_path(path: &str, reserved: &ReservedSegments) -> Option<String> {
    let mut segments = path_segments(path);
    let first = segments.next()?;
    let second = segments.next()?;

    if reserved.contains(first) || !reserved.contains(second) {
        return None;
    }

    let rest = path.trim_start_matches('/');
    let remainder = &rest[first.len()..];
    let remainder = remainder.trim_start_matches('/');
    Some(format!("/{remainder}"))
}

/// Layer applying [`strip_tenant_prefix`] ahead of the wrapped service.
#[derive(Debug, Clone)]
pub struct TenantPrefixLayer {
    reserved: Arc<ReservedSegments>,
}

impl TenantPrefixLayer {
    pub fn new(reserved: ReservedSegments) -> Self {
        Self {
            reserved: Arc::new(reserved),
        }
    }
}

impl<S> Layer<S> for TenantPrefixLayer {
    type Service = TenantPrefix<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TenantPrefix {
            inner,
            reserved: self.reserved.clone(),
        }
    }
}

/// Service produced by [`TenantPrefixLayer`].
#[derive(Debug, Clone)]
pub struct TenantPrefix<S> {
    inner: S,
    reserved: Arc<ReservedSegments>,
}

impl<S, B> Service<Request<B>> for TenantPrefix<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        self.inner.call(strip_tenant_prefix(request, &self.reserved))
    }
}
