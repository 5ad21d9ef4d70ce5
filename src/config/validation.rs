//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Reject rewrite rules that would not compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::rewrite::RewriteRule;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("upstream.address {0:?} is not a socket address")]
    UpstreamAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("rewrite rule #{index}: {message}")]
    Rewrite { index: usize, message: String },
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::UpstreamAddress(
            config.upstream.address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    for (index, rewrite) in config.rewrite.config.rewrites.iter().enumerate() {
        if let Err(e) = RewriteRule::new(&rewrite.header, &rewrite.regex, &rewrite.replacement) {
            errors.push(ValidationError::Rewrite {
                index,
                message: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
