//! Cookie record and its wire serialisation.

use chrono::{DateTime, Datelike, Utc};
use std::fmt;
use std::net::IpAddr;

/// IMF-fixdate, the `Expires` format emitted on the wire.
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `SameSite` attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    /// Attribute absent or unrecognised.
    #[default]
    Default,
    Lax,
    Strict,
    None,
}

/// Parsed `Max-Age` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    /// Cookie lives for this many seconds.
    Seconds(u64),
    /// Zero or negative `Max-Age`: delete the cookie now.
    ExpireNow,
}

/// A cookie extracted from a `Set-Cookie` header line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Value was wrapped in double quotes in transit.
    pub quoted: bool,
    pub domain: String,
    pub path: String,
    /// `Expires` attribute text as received.
    pub raw_expires: String,
    /// `None` when absent or unparseable.
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<MaxAge>,
    pub secure: bool,
    pub http_only: bool,
    pub partitioned: bool,
    pub same_site: SameSite,
    /// The full header line this cookie was parsed from.
    pub raw: String,
    /// Attribute segments that failed to parse, kept verbatim for pass-through.
    pub unparsed: Vec<String>,
}

impl Cookie {
    /// Create a bare `name=value` cookie.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// The `name=value` pair as sent in a `Cookie` request header.
    pub fn request_pair(&self) -> String {
        format!("{}={}", self.name, sanitize_value(&self.value, self.quoted))
    }
}

impl fmt::Display for Cookie {
    /// Serialises the cookie in `Set-Cookie` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.request_pair())?;

        if !self.path.is_empty() {
            write!(f, "; Path={}", sanitize_path(&self.path))?;
        }
        if !self.domain.is_empty() && is_valid_domain(&self.domain) {
            let domain = self.domain.strip_prefix('.').unwrap_or(&self.domain);
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(expires) = self.expires {
            if expires.year() >= 1601 {
                write!(f, "; Expires={}", expires.format(EXPIRES_FORMAT))?;
            }
        }
        match self.max_age {
            Some(MaxAge::Seconds(secs)) => write!(f, "; Max-Age={}", secs)?,
            Some(MaxAge::ExpireNow) => f.write_str("; Max-Age=0")?,
            None => {}
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        match self.same_site {
            SameSite::Default => {}
            SameSite::Lax => f.write_str("; SameSite=Lax")?,
            SameSite::Strict => f.write_str("; SameSite=Strict")?,
            SameSite::None => f.write_str("; SameSite=None")?,
        }
        if self.partitioned {
            f.write_str("; Partitioned")?;
        }
        for fragment in &self.unparsed {
            write!(f, "; {}", fragment)?;
        }
        Ok(())
    }
}

/// Bytes allowed in a cookie value: visible ASCII and space, minus `"`, `;` and `\`.
pub(crate) fn is_cookie_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}

fn sanitize_value(value: &str, quoted: bool) -> String {
    let clean: String = value
        .bytes()
        .filter(|b| is_cookie_value_byte(*b))
        .map(char::from)
        .collect();
    if quoted || clean.contains(' ') || clean.contains(',') {
        format!("\"{}\"", clean)
    } else {
        clean
    }
}

fn sanitize_path(path: &str) -> String {
    path.bytes()
        .filter(|b| (0x20..0x7f).contains(b) && *b != b';')
        .map(char::from)
        .collect()
}

/// Domain is emittable if it is a host name (optionally dot-prefixed or
/// fully qualified with a trailing dot) or an IP literal.
fn is_valid_domain(domain: &str) -> bool {
    if domain.parse::<IpAddr>().is_ok() && !domain.contains(':') {
        return true;
    }
    if domain.len() > 255 {
        return false;
    }
    let host = domain.strip_prefix('.').unwrap_or(domain);
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() {
        return false;
    }

    let mut has_letter = false;
    for label in host.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        for b in label.bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => has_letter = true,
                b'0'..=b'9' | b'-' => {}
                _ => return false,
            }
        }
    }
    has_letter
}
