//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → affinity::StickySession (cookie injection, capture)
//!     → upstream.rs (forward to upstream, write into sink)
//!     → response.rs (ResponseWriter → client response)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::X_REQUEST_ID;
pub use response::ResponseWriter;
pub use server::{AppState, HttpServer, ServerError};
pub use upstream::{UpstreamError, UpstreamForwarder};
