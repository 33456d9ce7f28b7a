//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every issue.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.port == 0 {
        issues.push(ConfigIssue::new("listener.port", "must be greater than 0"));
    }
    let bind_address = config.listener.bind_address();
    if bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "listener.ip",
            format!("'{}' is not a valid bind address", bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        issues.push(ConfigIssue::new("listener.max_body_size", "must be greater than 0"));
    }

    if config.timeouts.read_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.read_secs", "must be greater than 0"));
    }
    if config.timeouts.write_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.write_secs", "must be greater than 0"));
    }

    if config.routes.path.as_os_str().is_empty() {
        issues.push(ConfigIssue::new("routes.path", "must not be empty"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
