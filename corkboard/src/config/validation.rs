//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;
use crate::ratelimit::RatePolicy;

/// Validate the entire configuration.
pub fn validate_config(config: &CorkboardConfig) -> Result<(), ConfigError> {
    validate_store_config(&config.store)?;
    validate_rate_limit_config(&config.rate_limit)?;
    Ok(())
}

/// Validate store configuration.
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.op_timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "Store operation timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Validate rate governor configuration.
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.sweep_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "Rate limit sweep threshold must be greater than zero".to_string(),
        ));
    }

    validate_policy("default", &config.default_policy)?;
    for (route, policy) in &config.routes {
        validate_policy(route, policy)?;
    }
    Ok(())
}

fn validate_policy(route: &str, policy: &RatePolicy) -> Result<(), ConfigError> {
    if policy.capacity == 0 {
        return Err(ConfigError::ValidationError(format!(
            "Rate policy for '{route}' must have a capacity greater than zero"
        )));
    }
    if policy.window.is_zero() {
        return Err(ConfigError::ValidationError(format!(
            "Rate policy for '{route}' must have a non-zero window"
        )));
    }
    Ok(())
}
