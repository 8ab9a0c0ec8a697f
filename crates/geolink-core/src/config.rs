use crate::app_config::AppConfig;
use crate::permission::Permission;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup; no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_string());

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let connection_permission = match lookup("GEOLINK_CONNECTION_PERMISSION") {
        Ok(raw) => Some(raw.parse::<Permission>().map_err(|reason| {
            ConfigError::InvalidEnvVar {
                var: "GEOLINK_CONNECTION_PERMISSION".to_string(),
                reason,
            }
        })?),
        Err(_) => None,
    };

    Ok(AppConfig {
        log_level: or_default("GEOLINK_LOG_LEVEL", "info"),
        request_timeout_secs: parse_u64("GEOLINK_REQUEST_TIMEOUT_SECS", "30")?,
        connect_timeout_secs: parse_u64("GEOLINK_CONNECT_TIMEOUT_SECS", "10")?,
        user_agent: or_default("GEOLINK_USER_AGENT", "geolink/0.1 (link-conversion)"),
        connection_permission,
        automation_action: or_default("GEOLINK_AUTOMATION_ACTION", "noop"),
        automation_delay_secs: parse_u64("GEOLINK_AUTOMATION_DELAY_SECS", "3")?,
        web_timeout_secs: parse_u64("GEOLINK_WEB_TIMEOUT_SECS", "10")?,
    })
}
