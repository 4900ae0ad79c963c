//! Forwarding to the configured upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI to the upstream authority
//! - Stream the request body upstream
//! - Write the upstream response into a [`ResponseSink`]
//!
//! # Design Decisions
//! - Headers then status then body, so a recording sink sees cookies at commit
//! - Response bodies are buffered up to `max_body_bytes` on every path;
//!   exceeding it fails the request even without affinity
//! - Requests are downgraded to HTTP/1.1 towards the upstream

use axum::{
    body::Body,
    http::{
        uri::{Authority, InvalidUriParts, PathAndQuery, Scheme},
        Request, Response, Uri, Version,
    },
};
use futures_util::future::BoxFuture;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use thiserror::Error;

use crate::affinity::{Downstream, ResponseSink};
use crate::config::UpstreamConfig;
use crate::http::response::strip_hop_by_hop;

/// Errors talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream address {0:?}")]
    InvalidAddress(String),

    #[error("failed to build upstream URI: {0}")]
    Uri(#[from] InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream body: {0}")]
    Body(#[from] axum::Error),
}

/// [`Downstream`] that proxies to a single HTTP upstream.
#[derive(Clone)]
pub struct UpstreamForwarder {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    max_body_bytes: usize,
}

impl UpstreamForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let authority = Authority::from_str(&config.address)
            .map_err(|_| UpstreamError::InvalidAddress(config.address.clone()))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            authority,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    async fn send(&self, request: Request<Body>, sink: &mut dyn ResponseSink) -> Result<(), UpstreamError> {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts)?;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);

        let response: Response<Incoming> = self.client.request(Request::from_parts(parts, body)).await?;
        let (mut head, body) = response.into_parts();
        strip_hop_by_hop(&mut head.headers);

        let headers = sink.headers_mut();
        for (name, value) in head.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        sink.write_status(head.status);

        let bytes = axum::body::to_bytes(Body::new(body), self.max_body_bytes).await?;
        sink.write_body(&bytes);
        Ok(())
    }
}

impl Downstream for UpstreamForwarder {
    type Error = UpstreamError;

    fn forward<'a>(
        &'a self,
        request: Request<Body>,
        sink: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(self.send(request, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parsing() {
        let config = UpstreamConfig {
            address: "127.0.0.1:3000".into(),
            ..UpstreamConfig::default()
        };
        let forwarder = UpstreamForwarder::new(&config).unwrap();
        assert_eq!(forwarder.authority().as_str(), "127.0.0.1:3000");

        let bad = UpstreamConfig {
            address: "not an authority".into(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            UpstreamForwarder::new(&bad),
            Err(UpstreamError::InvalidAddress(_))
        ));
    }
}
