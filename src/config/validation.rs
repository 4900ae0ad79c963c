//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (cache size > 0, timeouts > 0)
//! - Check names and addresses are usable on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::cookie::is_valid_cookie_name;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("affinity.cacheSize must be positive")]
    ZeroCacheSize,

    #[error("affinity.headerName {0:?} is not a valid HTTP header name")]
    InvalidHeaderName(String),

    #[error("affinity.cookieName {0:?} is not a valid cookie name")]
    InvalidCookieName(String),

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be positive")]
    ZeroTimeout,

    #[error("upstream.max_body_bytes must be positive")]
    ZeroBodyLimit,
}

/// Check a deserialized configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let affinity = &config.affinity;
    if affinity.cache_size == 0 {
        errors.push(ValidationError::ZeroCacheSize);
    }
    if affinity.header_name.is_empty() || HeaderName::from_bytes(affinity.header_name.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(affinity.header_name.clone()));
    }
    if !is_valid_cookie_name(&affinity.cookie_name) {
        errors.push(ValidationError::InvalidCookieName(affinity.cookie_name.clone()));
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
