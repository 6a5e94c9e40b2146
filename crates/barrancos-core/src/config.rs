use crate::app_config::AppConfig;
use crate::ConfigError;

/// Browser-like default so the scraped sites serve their regular HTML.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; parsing is decoupled from the real environment
/// so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_as = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value is empty".to_string(),
            });
        }
        Ok(raw.trim().to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_as(var, default)?
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_as(var, default)?
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = parse_as(var, default)?
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value must be a finite number".to_string(),
            })
        }
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&parse_as(var, default)?).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "expected true/false".to_string(),
        })
    };

    let log_level = or_default("BARRANCOS_LOG_LEVEL", "info");
    let data_path = PathBuf::from(or_default("BARRANCOS_DATA_PATH", "data/canyons.json"));
    let catalog_path = PathBuf::from(or_default("BARRANCOS_CATALOG_PATH", "data/catalog.json"));
    let user_agent = or_default("BARRANCOS_USER_AGENT", DEFAULT_USER_AGENT);

    let request_timeout_secs = parse_u64("BARRANCOS_REQUEST_TIMEOUT_SECS", "30")?;
    let inter_request_delay_ms = parse_u64("BARRANCOS_INTER_REQUEST_DELAY_MS", "5000")?;
    let max_retries = parse_u32("BARRANCOS_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("BARRANCOS_RETRY_BACKOFF_BASE_SECS", "5")?;
    let default_zoom = parse_f64("BARRANCOS_DEFAULT_ZOOM", "14")?;

    let wikiloc_activity = or_default("BARRANCOS_WIKILOC_ACTIVITY", "46");
    let wikiloc_limit = parse_u32("BARRANCOS_WIKILOC_LIMIT", "10")?;
    let wikiloc_radius_km = parse_f64("BARRANCOS_WIKILOC_RADIUS_KM", "15")?;
    let wikiloc_use_map = parse_bool("BARRANCOS_WIKILOC_USE_MAP", "true")?;
    let wikiloc_cookie = lookup("BARRANCOS_WIKILOC_COOKIE")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let wikiloc_headers = lookup("BARRANCOS_WIKILOC_HEADERS")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        log_level,
        data_path,
        catalog_path,
        user_agent,
        request_timeout_secs,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
        default_zoom,
        wikiloc_activity,
        wikiloc_limit,
        wikiloc_radius_km,
        wikiloc_use_map,
        wikiloc_cookie,
        wikiloc_headers,
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`.
fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
