//! Cookie parse errors.

use thiserror::Error;

/// Errors that reject a whole `Set-Cookie` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CookieError {
    /// The line is empty after trimming.
    #[error("blank cookie")]
    BlankCookie,

    /// The first segment has no `=` separating name and value.
    #[error("'=' not found in cookie")]
    MissingEquals,

    /// The name is empty or contains non-token characters.
    #[error("invalid cookie name")]
    InvalidCookieName,

    /// The value contains bytes outside the cookie-octet range.
    #[error("invalid cookie value")]
    InvalidCookieValue,
}

impl CookieError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CookieError::BlankCookie => "blank_cookie",
            CookieError::MissingEquals => "missing_equals",
            CookieError::InvalidCookieName => "invalid_cookie_name",
            CookieError::InvalidCookieValue => "invalid_cookie_value",
        }
    }
}

/// A recognised attribute whose value could not be applied.
///
/// Never fatal: the segment is kept in [`Cookie::unparsed`](super::Cookie::unparsed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("invalid Max-Age: {0}")]
    MaxAge(String),

    #[error("invalid Expires: {0}")]
    Expires(String),
}
