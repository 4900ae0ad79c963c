//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all sticky handler
//! - Build the affinity cache once and share it with every request
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::affinity::{AffinityCache, AffinityError, StickySession};
use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, request_id, request_span, set_request_id_layer};
use crate::http::response::ResponseWriter;
use crate::http::upstream::{UpstreamError, UpstreamForwarder};
use crate::observability::metrics;

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Affinity(#[from] AffinityError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sticky: Arc<StickySession<UpstreamForwarder>>,
}

/// HTTP server for the sticky proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: Arc<AffinityCache>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the affinity cache cannot be built or the upstream address is unusable.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let cache = Arc::new(AffinityCache::new(config.affinity.cache_size)?);
        let forwarder = UpstreamForwarder::new(&config.upstream)?;
        let sticky = Arc::new(StickySession::new(forwarder, cache.clone(), config.affinity.clone()));

        let router = Self::build_router(&config, AppState { sticky });
        Ok(Self {
            router,
            config,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(sticky_handler))
            .route("/{*path}", any(sticky_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared affinity cache handle.
    pub fn cache(&self) -> Arc<AffinityCache> {
        self.cache.clone()
    }
}

/// Catch-all handler: every request goes through the sticky session.
async fn sticky_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let request_id = request_id(&request).to_string();

    let mut writer = ResponseWriter::new();
    let response = match state.sticky.handle(request, &mut writer).await {
        Ok(()) => writer.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}
