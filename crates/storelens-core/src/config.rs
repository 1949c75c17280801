use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var cannot be parsed. Unset vars fall
/// back to defaults; nothing is required.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    Ok(AppConfig {
        log_level: or_default("STORELENS_LOG_LEVEL", &defaults.log_level),
        user_agent: or_default("STORELENS_USER_AGENT", &defaults.user_agent),
        default_currency: or_default("STORELENS_DEFAULT_CURRENCY", &defaults.default_currency),
        request_timeout_ms: parse_u64(
            "STORELENS_REQUEST_TIMEOUT_MS",
            defaults.request_timeout_ms,
        )?,
        max_attempts: parse_u32("STORELENS_MAX_ATTEMPTS", defaults.max_attempts)?,
        retry_base_delay_ms: parse_u64(
            "STORELENS_RETRY_BASE_DELAY_MS",
            defaults.retry_base_delay_ms,
        )?,
        cache_ttl_minutes: parse_u64("STORELENS_CACHE_TTL_MINUTES", defaults.cache_ttl_minutes)?,
        cache_sweep_max_age_minutes: parse_u64(
            "STORELENS_CACHE_SWEEP_MAX_AGE_MINUTES",
            defaults.cache_sweep_max_age_minutes,
        )?,
        batch_size: parse_usize("STORELENS_BATCH_SIZE", defaults.batch_size)?,
        inter_batch_delay_ms: parse_u64(
            "STORELENS_INTER_BATCH_DELAY_MS",
            defaults.inter_batch_delay_ms,
        )?,
    })
}
