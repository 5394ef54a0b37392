//! Configuration loading from disk and environment.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix of environment variables that override file values.
pub const ENV_PREFIX: &str = "TXPROXY_";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, message: String },
    Validation(Vec<ValidationError>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, message } => write!(f, "Invalid value for {}: {}", key, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the process environment, and validate.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overwrite fields from `TXPROXY_<SECTION>_<FIELD>` variables.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    override_field(&lookup, "UPSTREAM_ADDRESS", &mut config.upstream.address)?;
    override_field(&lookup, "UPSTREAM_REQUEST_TIMEOUT_SECS", &mut config.upstream.request_timeout_secs)?;

    override_field(&lookup, "LISTENER_HOST", &mut config.listener.host)?;
    override_field(&lookup, "LISTENER_PORT", &mut config.listener.port)?;
    override_field(
        &lookup,
        "LISTENER_GRACEFUL_STOP_TIMEOUT_SECS",
        &mut config.listener.graceful_stop_timeout_secs,
    )?;
    override_field(&lookup, "LISTENER_MAX_BODY_BYTES", &mut config.listener.max_body_bytes)?;

    override_field(&lookup, "MONITOR_POLL_INTERVAL_SECS", &mut config.monitor.poll_interval_secs)?;
    override_field(&lookup, "MONITOR_MAX_ATTEMPTS", &mut config.monitor.max_attempts)?;
    override_field(&lookup, "MONITOR_MAX_WAIT_SECS", &mut config.monitor.max_wait_secs)?;
    override_field(
        &lookup,
        "MONITOR_FAIL_ON_UNKNOWN_STATUS",
        &mut config.monitor.fail_on_unknown_status,
    )?;

    override_field(&lookup, "OBSERVABILITY_LOG_LEVEL", &mut config.observability.log_level)?;
    override_field(&lookup, "OBSERVABILITY_METRICS_ENABLED", &mut config.observability.metrics_enabled)?;
    override_field(&lookup, "OBSERVABILITY_METRICS_ADDRESS", &mut config.observability.metrics_address)?;

    Ok(())
}

fn override_field<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let name = format!("{}{}", ENV_PREFIX, key);
    if let Some(raw) = lookup(&name) {
        *target = raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
            key: name.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(key = %name, "Configuration value overridden from environment");
    }
    Ok(())
}
