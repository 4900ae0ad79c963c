//! The "next step" a sticky session wraps.

use axum::{body::Body, http::Request};
use futures_util::future::BoxFuture;

use crate::affinity::sink::ResponseSink;

/// Forwards a request and writes the response into a sink.
///
/// Implemented by the host (an upstream client, a test double, another
/// handler). Cancellation and timeouts belong to the implementation.
pub trait Downstream: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn forward<'a>(
        &'a self,
        request: Request<Body>,
        sink: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), Self::Error>>;
}
