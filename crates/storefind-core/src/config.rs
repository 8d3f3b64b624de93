use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Unit};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which suits testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values fail. Kept separate
/// from the real environment so it can be tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("STOREFIND_ENV", "development"))?;
    let log_level = or_default("STOREFIND_LOG_LEVEL", "info");

    let search_url = or_default("STOREFIND_SEARCH_URL", "http://localhost:9200");
    let index_name = or_default("STOREFIND_INDEX", "stores");
    if index_name.trim().is_empty() {
        return Err(invalid("STOREFIND_INDEX", "must not be empty".to_string()));
    }
    let search_timeout_secs = parse_u64("STOREFIND_SEARCH_TIMEOUT_SECS", "30")?;

    let geocoder_url = or_default("STOREFIND_GEOCODER_URL", "https://maps.googleapis.com");
    let geocoder_api_key = lookup("STOREFIND_GEOCODER_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let geocoder_timeout_secs = parse_u64("STOREFIND_GEOCODER_TIMEOUT_SECS", "10")?;
    let geocoder_max_attempts = parse_u32("STOREFIND_GEOCODER_MAX_ATTEMPTS", "3")?;
    if geocoder_max_attempts == 0 {
        return Err(invalid(
            "STOREFIND_GEOCODER_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let geocoder_backoff_secs = parse_u64("STOREFIND_GEOCODER_BACKOFF_SECS", "10")?;

    let user_agent = or_default("STOREFIND_USER_AGENT", "storefind/0.1 (store-locator)");

    let bind_addr = or_default("STOREFIND_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STOREFIND_BIND_ADDR", e.to_string()))?;
    let request_timeout_secs = parse_u64("STOREFIND_REQUEST_TIMEOUT_SECS", "60")?;

    let default_unit = or_default("STOREFIND_DEFAULT_UNIT", "mi")
        .parse::<Unit>()
        .map_err(|e| invalid("STOREFIND_DEFAULT_UNIT", e.to_string()))?;

    Ok(AppConfig {
        env,
        log_level,
        search_url,
        index_name,
        search_timeout_secs,
        geocoder_url,
        geocoder_api_key,
        geocoder_timeout_secs,
        geocoder_max_attempts,
        geocoder_backoff_secs,
        user_agent,
        bind_addr,
        request_timeout_secs,
        default_unit,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFIND_ENV".to_string(),
            reason: format!("expected development, test or production, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
