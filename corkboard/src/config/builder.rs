//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use std::path::Path;
use std::time::Duration;

use super::{Result, models::*, validation};
use crate::ratelimit::RatePolicy;

/// Builder for creating CorkboardConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: CorkboardConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder preloaded with the defaults, for symmetry with the
    /// loader API.
    pub fn defaults() -> Self {
        Self::new()
    }

    /// Use in-memory storage (good for testing and embedded use)
    pub fn with_memory_store(mut self) -> Self {
        self.config.store.backend = StoreBackend::Memory;
        self
    }

    /// Set the per-call store deadline
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.config.store.op_timeout = timeout;
        self
    }

    /// Set the rate governor's bucket sweep threshold
    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.config.rate_limit.sweep_threshold = threshold;
        self
    }

    /// Set the rate policy applied to routes without an explicit entry
    pub fn with_default_rate_policy(mut self, policy: RatePolicy) -> Self {
        self.config.rate_limit.default_policy = policy;
        self
    }

    /// Set the rate policy for one route
    pub fn with_route_policy(mut self, route_key: impl Into<String>, policy: RatePolicy) -> Self {
        self.config.rate_limit.routes.insert(route_key.into(), policy);
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log output format
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Write logs to a file in addition to configuring stdout off
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<CorkboardConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
