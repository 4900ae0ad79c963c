//! Response output contract shared by real and recording sinks.

use axum::http::{HeaderMap, StatusCode};

/// Where a downstream step writes its response.
///
/// Headers are mutable until the status is written. The first
/// `write_status` commits the response; a body write before any status
/// commits `200 OK`. Header writes after the commit are discarded, so
/// every header on the wire, `Set-Cookie` included, is one that was seen
/// at commit.
pub trait ResponseSink: Send {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_status(&mut self, status: StatusCode);

    fn write_body(&mut self, chunk: &[u8]);
}
