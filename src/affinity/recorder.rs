//! Recording responder: captures a downstream response for inspection.
//!
//! # Responsibilities
//! - Buffer status, headers and body written by the downstream step
//! - Parse every `Set-Cookie` line when the status is committed
//! - Replay the captured response into the real sink, body untouched
//!
//! # Design Decisions
//! - Cookie parse failures drop only the offending line
//! - Replay re-serialises parsed cookies; unparseable lines are not forwarded
//! - A line that is not valid UTF-8 is parsed from a lossy copy but replayed
//!   from its original bytes
//! - Headers are frozen at commit, later writes are discarded
//! - Request-local, no synchronization

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode};
use std::borrow::Cow;

use crate::affinity::sink::ResponseSink;
use crate::cookie::{parse_set_cookie, Cookie};
use crate::observability::metrics;

#[derive(Debug)]
struct CapturedCookie {
    cookie: Cookie,
    /// Original header bytes when the line was not valid UTF-8.
    verbatim: Option<HeaderValue>,
}

/// A [`ResponseSink`] that buffers everything written to it.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    headers: HeaderMap,
    late_headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
    cookies: Vec<CapturedCookie>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Headers as they stood at commit (or so far, before it).
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Cookies extracted when the status was committed.
    pub fn cookies(&self) -> impl Iterator<Item = &Cookie> + '_ {
        self.cookies.iter().map(|captured| &captured.cookie)
    }

    /// Write the captured response into `sink`.
    ///
    /// Headers go first, with one `Set-Cookie` per captured cookie, then the
    /// status, then the body exactly as buffered.
    pub fn replay_into(mut self, sink: &mut dyn ResponseSink) {
        self.commit();
        if !self.late_headers.is_empty() {
            tracing::debug!(count = self.late_headers.len(), "Discarding headers written after commit");
        }

        self.headers.remove(SET_COOKIE);
        let headers = sink.headers_mut();
        for (name, value) in self.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        for CapturedCookie { cookie, verbatim } in self.cookies {
            if let Some(original) = verbatim {
                headers.append(SET_COOKIE, original);
                continue;
            }
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => {
                    tracing::warn!(cookie = %cookie.name, error = %e, "Dropping unrepresentable Set-Cookie");
                }
            }
        }

        sink.write_status(self.status.unwrap_or(StatusCode::OK));
        if !self.body.is_empty() {
            sink.write_body(&self.body);
        }
    }

    /// Commit `200 OK` if the downstream step never wrote a status.
    pub fn commit(&mut self) {
        if self.status.is_none() {
            self.write_status(StatusCode::OK);
        }
    }

    fn capture_cookies(&mut self) {
        for value in self.headers.get_all(SET_COOKIE) {
            let (line, verbatim) = match value.to_str() {
                Ok(line) => (Cow::Borrowed(line), None),
                Err(_) => (String::from_utf8_lossy(value.as_bytes()), Some(value.clone())),
            };
            match parse_set_cookie(&line) {
                Ok(cookie) => self.cookies.push(CapturedCookie { cookie, verbatim }),
                Err(e) => {
                    tracing::warn!(line = %line, error = %e, "Failed to parse Set-Cookie");
                    metrics::record_cookie_parse_failure(e.kind());
                }
            }
        }
    }
}

impl ResponseSink for RecordingResponder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.status.is_some() {
            &mut self.late_headers
        } else {
            &mut self.headers
        }
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            tracing::debug!(committed = %committed, ignored = %status, "Superfluous status write");
            return;
        }
        self.status = Some(status);
        self.capture_cookies();
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.commit();
        self.body.extend_from_slice(chunk);
    }
}
