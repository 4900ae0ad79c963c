//! Sticky-session reverse proxy library.
//!
//! Correlates a client-identifying request header with the session cookie
//! the upstream issues, so later requests from the same client resume that
//! session even before the client presents the cookie itself.

pub mod affinity;
pub mod config;
pub mod cookie;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use affinity::{AffinityCache, StickySession};
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
