//! Sticky session orchestration.
//!
//! # Request Flow
//! ```text
//! Init
//!   → identifier header absent → forward untouched (pass-through, terminal)
//!   → IdentifierResolved: cache lookup, inject session cookie on hit
//!   → Forwarded: downstream writes into a RecordingResponder
//!   → ResponseCaptured: tracked cookie refreshes the cache
//!   → Replayed: captured response written to the real sink
//! ```
//!
//! # Design Decisions
//! - Downstream errors propagate unchanged and leave the cache untouched
//! - Injection never checks for a cookie the client already sent
//! - Only headers are inspected; the body is replayed as-is

use axum::{
    body::Body,
    http::{header::COOKIE, HeaderMap, HeaderValue, Request},
};
use std::sync::Arc;

use crate::affinity::cache::AffinityCache;
use crate::affinity::downstream::Downstream;
use crate::affinity::recorder::RecordingResponder;
use crate::affinity::sink::ResponseSink;
use crate::config::AffinityConfig;
use crate::cookie::Cookie;
use crate::observability::metrics;

/// Session affinity around a downstream step.
pub struct StickySession<D> {
    downstream: D,
    cache: Arc<AffinityCache>,
    config: AffinityConfig,
}

impl<D: Downstream> StickySession<D> {
    pub fn new(downstream: D, cache: Arc<AffinityCache>, config: AffinityConfig) -> Self {
        Self {
            downstream,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<AffinityCache> {
        &self.cache
    }

    /// Handle one request, writing the response into `sink`.
    pub async fn handle(
        &self,
        mut request: Request<Body>,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), D::Error> {
        let Some(client_id) = client_identifier(request.headers(), &self.config.header_name) else {
            tracing::trace!(header = %self.config.header_name, "No client identifier, passing through");
            metrics::record_passthrough();
            return self.downstream.forward(request, sink).await;
        };

        match self.cache.get(&client_id) {
            Some(session) => {
                tracing::debug!(client = %client_id, "Resuming cached session");
                metrics::record_cache_lookup(true);
                let cookie = Cookie {
                    path: "/".to_string(),
                    http_only: true,
                    ..Cookie::new(self.config.cookie_name.as_str(), session)
                };
                add_cookie(request.headers_mut(), &cookie);
            }
            None => {
                tracing::debug!(client = %client_id, "No cached session");
                metrics::record_cache_lookup(false);
            }
        }

        let mut recorder = RecordingResponder::new();
        self.downstream.forward(request, &mut recorder).await?;
        recorder.commit();

        for cookie in recorder.cookies() {
            if cookie.name == self.config.cookie_name {
                tracing::debug!(client = %client_id, "Updating session affinity");
                self.cache.put(client_id.as_str(), cookie.value.as_str());
                metrics::record_cache_update();
            }
        }

        recorder.replay_into(sink);
        Ok(())
    }
}

/// First value of `header_name`; empty or non-UTF-8 counts as absent.
fn client_identifier(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Append `cookie` to the request's `Cookie` header.
///
/// The existing value is extended byte for byte, so cookies the client sent
/// survive even when they are not valid UTF-8.
fn add_cookie(headers: &mut HeaderMap, cookie: &Cookie) {
    let pair = cookie.request_pair();
    let combined = match headers.get(COOKIE).map(HeaderValue::as_bytes) {
        Some(existing) if !existing.is_empty() => {
            let mut bytes = Vec::with_capacity(existing.len() + 2 + pair.len());
            bytes.extend_from_slice(existing);
            bytes.extend_from_slice(b"; ");
            bytes.extend_from_slice(pair.as_bytes());
            bytes
        }
        _ => pair.into_bytes(),
    };

    match HeaderValue::from_bytes(&combined) {
        Ok(value) => {
            headers.insert(COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(cookie = %cookie.name, error = %e, "Cannot inject session cookie");
        }
    }
}
