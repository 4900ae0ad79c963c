//! `Set-Cookie` line parser (RFC 6265).
//!
//! # Design Decisions
//! - Only the name/value pair can fail the whole line
//! - Bad attributes are kept verbatim in `unparsed`, never dropped silently
//!   (except names that are not printable ASCII)
//! - Stateless and allocation-light: one `Cookie` per call

use crate::cookie::attributes::{to_lower_printable, Attribute};
use crate::cookie::error::CookieError;
use crate::cookie::types::{is_cookie_value_byte, Cookie};

/// Parse a single `Set-Cookie` header value.
pub fn parse_set_cookie(line: &str) -> Result<Cookie, CookieError> {
    let trimmed = trim_ows(line);
    if trimmed.is_empty() {
        return Err(CookieError::BlankCookie);
    }

    let mut parts = trimmed.split(';');
    let first = parts.next().map(trim_ows).unwrap_or_default();
    let (name, value) = first.split_once('=').ok_or(CookieError::MissingEquals)?;
    let name = trim_ows(name);
    if !is_valid_cookie_name(name) {
        return Err(CookieError::InvalidCookieName);
    }
    let (value, quoted) = parse_cookie_value(value, true).ok_or(CookieError::InvalidCookieValue)?;

    let mut cookie = Cookie {
        name: name.to_string(),
        value: value.to_string(),
        quoted,
        raw: line.to_string(),
        ..Cookie::default()
    };

    for segment in parts.map(trim_ows).filter(|s| !s.is_empty()) {
        let (attr, val) = segment.split_once('=').unwrap_or((segment, ""));
        let Some(lower_attr) = to_lower_printable(attr) else {
            continue;
        };
        let Some((val, _)) = parse_cookie_value(val, false) else {
            cookie.unparsed.push(segment.to_string());
            continue;
        };

        let applied = match Attribute::lookup(&lower_attr) {
            Some(attribute) => attribute.apply(&mut cookie, val).is_ok(),
            None => false,
        };
        if !applied {
            cookie.unparsed.push(segment.to_string());
        }
    }

    Ok(cookie)
}

/// Whether `name` is a non-empty RFC 7230 token.
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_byte)
}

/// Validate a cookie value, stripping one surrounding pair of double quotes
/// when `allow_quotes` is set. Returns the value and whether it was quoted.
fn parse_cookie_value(raw: &str, allow_quotes: bool) -> Option<(&str, bool)> {
    let (value, quoted) = match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(inner) if allow_quotes => (inner, true),
        _ => (raw, false),
    };
    value
        .bytes()
        .all(is_cookie_value_byte)
        .then_some((value, quoted))
}

fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~'
        | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

/// Trim HTTP optional whitespace.
fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::types::{MaxAge, SameSite};

    #[test]
    fn test_session_cookie() {
        let cookie = parse_set_cookie("session=abc123; Path=/; HttpOnly").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.path, "/");
        assert!(cookie.http_only);
        assert!(!cookie.secure);
        assert!(cookie.unparsed.is_empty());
        assert_eq!(cookie.raw, "session=abc123; Path=/; HttpOnly");
    }

    #[test]
    fn test_fatal_errors() {
        assert_eq!(parse_set_cookie(""), Err(CookieError::BlankCookie));
        assert_eq!(parse_set_cookie("   \t"), Err(CookieError::BlankCookie));
        assert_eq!(parse_set_cookie("novalue"), Err(CookieError::MissingEquals));
        assert_eq!(parse_set_cookie("=abc"), Err(CookieError::InvalidCookieName));
        assert_eq!(parse_set_cookie("=novalue"), Err(CookieError::InvalidCookieName));
        assert_eq!(parse_set_cookie("bad name=x"), Err(CookieError::InvalidCookieName));
        assert_eq!(parse_set_cookie("a=b\\c"), Err(CookieError::InvalidCookieValue));
        assert_eq!(parse_set_cookie("a=\u{e9}t\u{e9}"), Err(CookieError::InvalidCookieValue));
    }

    #[test]
    fn test_lone_separator_is_not_blank() {
        assert_eq!(parse_set_cookie(";"), Err(CookieError::MissingEquals));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let cookie = parse_set_cookie("a=; Secure").unwrap();
        assert_eq!(cookie.value, "");
        assert!(cookie.secure);
    }

    #[test]
    fn test_quoted_value() {
        let cookie = parse_set_cookie("a=\"quoted value\"").unwrap();
        assert_eq!(cookie.value, "quoted value");
        assert!(cookie.quoted);

        let lone = parse_set_cookie("a=\"").unwrap_err();
        assert_eq!(lone, CookieError::InvalidCookieValue);
    }

    #[test]
    fn test_all_attributes() {
        let cookie = parse_set_cookie(
            "id=a3fWa; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=2592000; \
             Domain=example.com; path=/docs; SECURE; HttpOnly; SameSite=Lax; Partitioned",
        )
        .unwrap();
        assert_eq!(cookie.raw_expires, "Wed, 21 Oct 2015 07:28:00 GMT");
        assert!(cookie.expires.is_some());
        assert_eq!(cookie.max_age, Some(MaxAge::Seconds(2592000)));
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/docs");
        assert!(cookie.secure && cookie.http_only && cookie.partitioned);
        assert_eq!(cookie.same_site, SameSite::Lax);
        assert!(cookie.unparsed.is_empty());
    }

    #[test]
    fn test_malformed_attribute_does_not_abort() {
        let cookie = parse_set_cookie("a=b; Max-Age=0x1; Path=/app; Secure").unwrap();
        assert_eq!(cookie.unparsed, vec!["Max-Age=0x1".to_string()]);
        assert_eq!(cookie.max_age, None);
        assert_eq!(cookie.path, "/app");
        assert!(cookie.secure);
    }

    #[test]
    fn test_leading_zero_max_age_is_unparsed() {
        let cookie = parse_set_cookie("a=b; Max-Age=0001").unwrap();
        assert_eq!(cookie.unparsed, vec!["Max-Age=0001".to_string()]);

        let zero = parse_set_cookie("a=b; Max-Age=0").unwrap();
        assert_eq!(zero.max_age, Some(MaxAge::ExpireNow));
    }

    #[test]
    fn test_bad_expires_recorded_and_unparsed() {
        let cookie = parse_set_cookie("a=b; Expires=tomorrow").unwrap();
        assert_eq!(cookie.raw_expires, "tomorrow");
        assert!(cookie.expires.is_none());
        assert_eq!(cookie.unparsed, vec!["Expires=tomorrow".to_string()]);
    }

    #[test]
    fn test_unknown_and_invalid_attributes() {
        let cookie = parse_set_cookie("a=b; Priority=High; Path=\"/x\"; Path =/y").unwrap();
        assert_eq!(
            cookie.unparsed,
            vec![
                "Priority=High".to_string(),
                "Path=\"/x\"".to_string(),
                "Path =/y".to_string(),
            ]
        );
        assert_eq!(cookie.path, "");
    }

    #[test]
    fn test_non_ascii_attribute_name_is_dropped() {
        let cookie = parse_set_cookie("a=b; P\u{e4}th=/; Secure").unwrap();
        assert!(cookie.unparsed.is_empty());
        assert!(cookie.secure);
    }

    #[test]
    fn test_whitespace_handling() {
        let cookie = parse_set_cookie("  a = b ;  ;Path=/  ").unwrap();
        assert_eq!(cookie.name, "a");
        // The value keeps its leading space
        assert_eq!(cookie.value, " b");
        assert_eq!(cookie.path, "/");
    }

    #[test]
    fn test_round_trip_request_pair() {
        let cookie = parse_set_cookie("whoami_session=tokA-42_x.y; Path=/").unwrap();
        assert_eq!(cookie.request_pair(), "whoami_session=tokA-42_x.y");
    }

    #[test]
    fn test_cookie_names() {
        assert!(is_valid_cookie_name("whoami_session"));
        assert!(is_valid_cookie_name("__Host-id"));
        assert!(!is_valid_cookie_name(""));
        assert!(!is_valid_cookie_name("a b"));
        assert!(!is_valid_cookie_name("a=b"));
        assert!(!is_valid_cookie_name("a\"b"));
    }
}
