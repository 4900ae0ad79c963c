//! `Set-Cookie` attribute dispatch.
//!
//! Attribute names are matched case-insensitively through a fixed lookup
//! table. Each recognised attribute knows how to apply its value to a
//! [`Cookie`]; a rejected value leaves the cookie untouched (apart from
//! `raw_expires`) and the caller keeps the segment in `unparsed`.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::cookie::error::AttributeError;
use crate::cookie::types::{Cookie, MaxAge, SameSite};

/// Recognised cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    SameSite,
    Secure,
    HttpOnly,
    Domain,
    Path,
    MaxAge,
    Expires,
    Partitioned,
}

/// Lower-cased attribute name → attribute.
const ATTRIBUTES: [(&str, Attribute); 8] = [
    ("samesite", Attribute::SameSite),
    ("secure", Attribute::Secure),
    ("httponly", Attribute::HttpOnly),
    ("domain", Attribute::Domain),
    ("path", Attribute::Path),
    ("max-age", Attribute::MaxAge),
    ("expires", Attribute::Expires),
    ("partitioned", Attribute::Partitioned),
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// RFC 1123 first, then the legacy dashed form. Weekday and zone are checked separately.
const EXPIRES_LAYOUTS: [&str; 2] = ["%d %b %Y %H:%M:%S", "%d-%b-%Y %H:%M:%S"];

impl Attribute {
    /// Look up an already lower-cased attribute name.
    pub fn lookup(lower_name: &str) -> Option<Self> {
        ATTRIBUTES
            .iter()
            .find(|(name, _)| *name == lower_name)
            .map(|(_, attribute)| *attribute)
    }

    /// Apply `value` to `cookie`.
    pub fn apply(self, cookie: &mut Cookie, value: &str) -> Result<(), AttributeError> {
        match self {
            Attribute::SameSite => {
                cookie.same_site = match to_lower_printable(value).as_deref() {
                    Some("lax") => SameSite::Lax,
                    Some("strict") => SameSite::Strict,
                    Some("none") => SameSite::None,
                    _ => SameSite::Default,
                };
            }
            Attribute::Secure => cookie.secure = true,
            Attribute::HttpOnly => cookie.http_only = true,
            Attribute::Partitioned => cookie.partitioned = true,
            Attribute::Domain => cookie.domain = value.to_string(),
            Attribute::Path => cookie.path = value.to_string(),
            Attribute::MaxAge => cookie.max_age = Some(parse_max_age(value)?),
            Attribute::Expires => {
                cookie.raw_expires = value.to_string();
                cookie.expires = parse_expires(value);
                if cookie.expires.is_none() {
                    return Err(AttributeError::Expires(value.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Lower-case `s` if every byte is printable ASCII.
pub(crate) fn to_lower_printable(s: &str) -> Option<String> {
    if s.bytes().all(|b| (b' '..=b'~').contains(&b)) {
        Some(s.to_ascii_lowercase())
    } else {
        None
    }
}

// Non-zero values spelled with a leading zero ("0001") are rejected; "00" and "-0" pass as zero.
fn parse_max_age(value: &str) -> Result<MaxAge, AttributeError> {
    let secs: i64 = value
        .parse()
        .map_err(|_| AttributeError::MaxAge(value.to_string()))?;
    if secs != 0 && value.starts_with('0') {
        return Err(AttributeError::MaxAge(value.to_string()));
    }
    if secs <= 0 {
        Ok(MaxAge::ExpireNow)
    } else {
        Ok(MaxAge::Seconds(secs as u64))
    }
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    let (stamp, zone) = value.rsplit_once(' ')?;
    if !is_zone_abbreviation(zone) {
        return None;
    }
    let (weekday, rest) = stamp.split_once(", ")?;
    if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
        return None;
    }
    if !has_fixed_width_fields(rest) {
        return None;
    }
    EXPIRES_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(rest, layout).ok())
        .map(|naive| naive.and_utc())
}

// Day, year, minute and second are fixed width; only the hour may drop its leading zero.
fn has_fixed_width_fields(stamp: &str) -> bool {
    let Some((date, time)) = stamp.rsplit_once(' ') else {
        return false;
    };
    let date: Vec<&str> = date.split([' ', '-']).collect();
    let time: Vec<&str> = time.split(':').collect();
    match (date.as_slice(), time.as_slice()) {
        ([day, _, year], [hour, minute, second]) => {
            is_digits(day, 2, 2)
                && is_digits(year, 4, 4)
                && is_digits(hour, 1, 2)
                && is_digits(minute, 2, 2)
                && is_digits(second, 2, 2)
        }
        _ => false,
    }
}

fn is_digits(field: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

// Zone abbreviations ("GMT", "UTC", "PST") are all read as UTC.
fn is_zone_abbreviation(zone: &str) -> bool {
    (3..=5).contains(&zone.len()) && zone.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lookup_table() {
        assert_eq!(Attribute::lookup("max-age"), Some(Attribute::MaxAge));
        assert_eq!(Attribute::lookup("httponly"), Some(Attribute::HttpOnly));
        assert_eq!(Attribute::lookup("partitioned"), Some(Attribute::Partitioned));
        // Callers lower-case first
        assert_eq!(Attribute::lookup("Path"), None);
        assert_eq!(Attribute::lookup("priority"), None);
    }

    #[test]
    fn test_max_age() {
        assert_eq!(parse_max_age("3600"), Ok(MaxAge::Seconds(3600)));
        assert_eq!(parse_max_age("+5"), Ok(MaxAge::Seconds(5)));
        assert_eq!(parse_max_age("0"), Ok(MaxAge::ExpireNow));
        assert_eq!(parse_max_age("-30"), Ok(MaxAge::ExpireNow));
        assert!(parse_max_age("0x1").is_err());
        assert!(parse_max_age("0001").is_err());
        assert!(parse_max_age("").is_err());
        assert!(parse_max_age("ten").is_err());
    }

    #[test]
    fn test_max_age_zero_spellings() {
        // Leading-zero rule only bites non-zero values
        assert_eq!(parse_max_age("00"), Ok(MaxAge::ExpireNow));
        assert_eq!(parse_max_age("-0"), Ok(MaxAge::ExpireNow));
    }

    #[test]
    fn test_expires_formats() {
        let expected = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(parse_expires("Wed, 21 Oct 2015 07:28:00 GMT"), Some(expected));
        assert_eq!(parse_expires("Wed, 21-Oct-2015 07:28:00 GMT"), Some(expected));
        assert_eq!(parse_expires("Wed, 21 Oct 2015 07:28:00 UTC"), Some(expected));
        assert_eq!(parse_expires("2015-10-21T07:28:00Z"), None);
        assert_eq!(parse_expires("Wed, 21 Oct 2015 07:28:00 +0000"), None);
        assert_eq!(parse_expires("Xyz, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_expires_field_widths() {
        let early = Utc.with_ymd_and_hms(2015, 10, 1, 7, 28, 0).unwrap();
        assert_eq!(parse_expires("Thu, 01 Oct 2015 07:28:00 GMT"), Some(early));
        assert_eq!(parse_expires("Thu, 01 Oct 2015 7:28:00 GMT"), Some(early));
        assert_eq!(parse_expires("Thu, 1 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_expires("Thu, 1-Oct-2015 07:28:00 GMT"), None);
        assert_eq!(parse_expires("Thu, 01 Oct 15 07:28:00 GMT"), None);
        assert_eq!(parse_expires("Thu, 01 Oct 2015 07:8:00 GMT"), None);
    }

    #[test]
    fn test_expires_failure_keeps_raw_text() {
        let mut cookie = Cookie::new("a", "b");
        let result = Attribute::Expires.apply(&mut cookie, "soon");
        assert!(matches!(result, Err(AttributeError::Expires(_))));
        assert_eq!(cookie.raw_expires, "soon");
        assert!(cookie.expires.is_none());
    }

    #[test]
    fn test_same_site_values() {
        let mut cookie = Cookie::new("a", "b");
        Attribute::SameSite.apply(&mut cookie, "STRICT").unwrap();
        assert_eq!(cookie.same_site, SameSite::Strict);
        Attribute::SameSite.apply(&mut cookie, "none").unwrap();
        assert_eq!(cookie.same_site, SameSite::None);
        Attribute::SameSite.apply(&mut cookie, "bogus").unwrap();
        assert_eq!(cookie.same_site, SameSite::Default);
        Attribute::SameSite.apply(&mut cookie, "l\u{e4}x").unwrap();
        assert_eq!(cookie.same_site, SameSite::Default);
    }

    #[test]
    fn test_flags_ignore_value() {
        let mut cookie = Cookie::new("a", "b");
        Attribute::Secure.apply(&mut cookie, "no").unwrap();
        Attribute::HttpOnly.apply(&mut cookie, "").unwrap();
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }
}
