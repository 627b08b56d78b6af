//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (buffers and intervals > 0, addresses parse)
//! - Check the ACL source is unambiguous
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
    #[error("acl: set exactly one of `inline` or `path`")]
    AclSource,
    #[error("telemetry.log_buffer must be greater than zero")]
    LogBuffer,
    #[error("telemetry.max_stat_interval_secs must be greater than zero")]
    MaxStatInterval,
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.acl.inline.is_some() == config.acl.path.is_some() {
        errors.push(ValidationError::AclSource);
    }
    if config.telemetry.log_buffer == 0 {
        errors.push(ValidationError::LogBuffer);
    }
    if config.telemetry.max_stat_interval_secs == 0 {
        errors.push(ValidationError::MaxStatInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
