//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.
//! Every field has a default so a minimal file only needs the upstream address.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the broadcast proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream broadcaster settings.
    pub upstream: UpstreamConfig,

    /// Inbound listener settings.
    pub listener: ListenerConfig,

    /// Status polling settings.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream broadcaster configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL (e.g., "http://localhost:8080").
    pub address: String,

    /// Timeout for each upstream call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// How long in-flight requests may run after shutdown begins.
    pub graceful_stop_timeout_secs: u64,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    /// "host:port" string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn graceful_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_stop_timeout_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            graceful_stop_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Status polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Fixed delay between status checks in seconds.
    pub poll_interval_secs: u64,

    /// Maximum number of status checks per transaction (0 = unbounded).
    pub max_attempts: u32,

    /// Maximum monitoring time per transaction in seconds (0 = unbounded).
    pub max_wait_secs: u64,

    /// Treat statuses outside the known set as an error instead of pending.
    pub fail_on_unknown_status: bool,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// `None` when the wall-clock bound is disabled.
    pub fn max_wait(&self) -> Option<Duration> {
        (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_attempts: 120,
            max_wait_secs: 600,
            fail_on_unknown_status: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
