//! Configuration model definitions.
//!
//! This module contains the configuration structures for all Corkboard
//! components.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ratelimit::RatePolicy;

/// Main configuration structure for Corkboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorkboardConfig {
    /// Storage configuration
    pub store: StoreConfig,

    /// Rate governor configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which relationship/content store backend to construct
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process storage for testing and embedded deployments
    Memory,
}

/// Configuration for the store collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to construct
    pub backend: StoreBackend,

    /// Deadline applied to every individual store call. A timeout surfaces
    /// as a store failure; the engine never retries internally.
    #[serde(with = "humantime_serde")]
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            op_timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the rate governor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket-table size above which idle buckets are swept
    pub sweep_threshold: usize,

    /// Policy applied to routes with no explicit entry
    pub default_policy: RatePolicy,

    /// Per-route policy overrides, keyed by route key
    pub routes: HashMap<String, RatePolicy>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            sweep_threshold: 1024,
            default_policy: RatePolicy::default(),
            routes: HashMap::new(),
        }
    }
}

impl RateLimitConfig {
    /// The policy for a route, falling back to the default
    pub fn policy_for(&self, route_key: &str) -> RatePolicy {
        self.routes
            .get(route_key)
            .copied()
            .unwrap_or(self.default_policy)
    }
}

/// Log verbosity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Log output formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-oriented multi-line output
    Pretty,
    /// Single-line output
    Compact,
    /// Structured JSON output
    Json,
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Whether to write to stdout
    pub stdout: bool,

    /// Optional log file path
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            stdout: true,
            file: None,
        }
    }
}
