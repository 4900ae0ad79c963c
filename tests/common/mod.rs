//! Shared utilities for integration testing.

use axum::{
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap,
    },
    response::{AppendHeaders, IntoResponse},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use sticky_proxy::{AffinityCache, HttpServer, ProxyConfig, Shutdown};

pub const LARGE_BODY_BYTES: usize = 64 * 1024;

/// Start a mock upstream on an ephemeral port.
///
/// - `GET /login` issues the tracked session cookie plus an unrelated one
/// - `GET /whoami` echoes the `Cookie` header it received
/// - `GET /large` returns a body of `LARGE_BODY_BYTES`
pub async fn start_session_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/login", get(login))
        .route("/whoami", get(whoami))
        .route("/large", get(|| async { "x".repeat(LARGE_BODY_BYTES) }));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn login() -> impl IntoResponse {
    (
        AppendHeaders([
            (SET_COOKIE, "whoami_session=tokA; Path=/"),
            (SET_COOKIE, "theme=dark; Max-Age=0x1"),
            (SET_COOKIE, "=orphan"),
        ]),
        "logged in",
    )
}

async fn whoami(headers: HeaderMap) -> String {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// A running proxy plus the handles a test needs.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub cache: Arc<AffinityCache>,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the sticky proxy in front of `upstream`.
pub async fn start_proxy(upstream: SocketAddr) -> TestProxy {
    start_proxy_with(upstream, |_| {}).await
}

/// Start the sticky proxy, adjusting the test defaults with `configure`.
pub async fn start_proxy_with(upstream: SocketAddr, configure: impl FnOnce(&mut ProxyConfig)) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ProxyConfig::default();
    config.listener.bind_address = addr.to_string();
    config.upstream.address = upstream.to_string();
    config.affinity.cache_size = 8;
    configure(&mut config);

    let server = HttpServer::new(config).unwrap();
    let cache = server.cache();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, cache, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
