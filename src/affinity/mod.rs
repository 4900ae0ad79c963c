//! Session affinity subsystem.
//!
//! # Data Flow
//! ```text
//! Request (identifier header)
//!     → middleware.rs (StickySession: lookup, cookie injection)
//!     → cache.rs (AffinityCache, shared across requests)
//!     → downstream.rs (host-provided next step)
//!     → recorder.rs (capture, Set-Cookie parsing, replay)
//!     → sink.rs (ResponseSink contract, real or recording)
//! ```
//!
//! # Design Decisions
//! - The cache is the only cross-request state; everything else is request-local
//! - The cache is injected, never global
//! - Capture-then-replay keeps the client response byte-identical

pub mod cache;
pub mod downstream;
pub mod middleware;
pub mod recorder;
pub mod sink;

pub use cache::{AffinityCache, AffinityError};
pub use downstream::Downstream;
pub use middleware::StickySession;
pub use recorder::RecordingResponder;
pub use sink::ResponseSink;
