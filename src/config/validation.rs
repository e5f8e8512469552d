//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint URLs and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{AppConfig, FeePolicy};

/// Upper bound on the validity window (one year).
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("network.horizon_url", &config.network.horizon_url, &mut errors);
    check_http_url("network.friendbot_url", &config.network.friendbot_url, &mut errors);

    if config.network.passphrase.trim().is_empty() {
        errors.push(ValidationError::new("network.passphrase", "must not be empty"));
    }

    if config.transaction.fee_policy == FeePolicy::Fixed && config.transaction.base_fee == 0 {
        errors.push(ValidationError::new(
            "transaction.base_fee",
            "must be greater than zero",
        ));
    }

    if !config.transaction.no_expiry && config.transaction.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transaction.timeout_secs",
            "must be greater than zero unless no_expiry is set",
        ));
    }
    if config.transaction.timeout_secs > MAX_TIMEOUT_SECS {
        errors.push(ValidationError::new(
            "transaction.timeout_secs",
            format!("must not exceed {} seconds", MAX_TIMEOUT_SECS),
        ));
    }

    if config.credentials.path.trim().is_empty() {
        errors.push(ValidationError::new("credentials.path", "must not be empty"));
    }

    if config.http.timeout_secs == 0 {
        errors.push(ValidationError::new("http.timeout_secs", "must be greater than zero"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
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
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = AppConfig::default();
        config.network.horizon_url = String::new();
        config.network.friendbot_url = "ftp://friendbot.example".to_string();
        config.transaction.base_fee = 0;
        config.transaction.timeout_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "network.horizon_url",
                "network.friendbot_url",
                "transaction.base_fee",
                "transaction.timeout_secs",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_timeout_upper_bound() {
        let mut config = AppConfig::default();
        config.transaction.timeout_secs = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "transaction.timeout_secs");

        config.transaction.timeout_secs = MAX_TIMEOUT_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_allowed_without_expiry() {
        let mut config = AppConfig::default();
        config.transaction.timeout_secs = 0;
        config.transaction.no_expiry = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_base_fee_allowed_for_network_minimum() {
        let mut config = AppConfig::default();
        config.transaction.base_fee = 0;
        config.transaction.fee_policy = FeePolicy::NetworkMinimum;
        assert!(validate_config(&config).is_ok());
    }
}
