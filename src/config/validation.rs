//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. All problems are
//! reported at once instead of stopping at the first.

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// Smallest read buffer hyper accepts for the request head.
pub const MIN_HEADER_BYTES: usize = 8192;

/// Longest lifetime an issued token may have (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::new("timeouts.read_secs", "must be greater than 0"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::new("timeouts.write_secs", "must be greater than 0"));
    }

    if config.limits.max_header_bytes < MIN_HEADER_BYTES {
        errors.push(ValidationError::new(
            "limits.max_header_bytes",
            format!("must be at least {MIN_HEADER_BYTES}"),
        ));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::new(
            "shutdown.grace_period_secs",
            "must be greater than 0",
        ));
    }

    if config.database.url.trim().is_empty() {
        errors.push(ValidationError::new("database.url", "must not be empty"));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::new(
            "database.max_connections",
            "must be greater than 0",
        ));
    }

    if config.auth.verification_secret.is_empty() {
        errors.push(ValidationError::new(
            "auth.verification_secret",
            "must not be empty",
        ));
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.token_ttl_secs", "must be greater than 0"));
    } else if config.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
        errors.push(ValidationError::new(
            "auth.token_ttl_secs",
            format!("must be at most {MAX_TOKEN_TTL_SECS}"),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_error() {
        let mut config = ServiceConfig::default();
        config.timeouts.read_secs = 0;
        config.limits.max_header_bytes = 1024;
        config.shutdown.grace_period_secs = 0;
        config.auth.verification_secret.clear();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "timeouts.read_secs",
                "limits.max_header_bytes",
                "shutdown.grace_period_secs",
                "auth.verification_secret",
            ]
        );
    }

    #[test]
    fn token_ttl_is_bounded() {
        let mut config = ServiceConfig::default();
        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(validate_config(&config).is_ok());

        config.auth.token_ttl_secs = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.token_ttl_secs");
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
