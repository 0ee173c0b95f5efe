use crate::app_config::{AppConfig, Environment};
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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// development configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("FRIPLASS_ENV", "development"))?;

    let bind_addr = parse_addr("FRIPLASS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("FRIPLASS_LOG_LEVEL", "info");
    let data_path = PathBuf::from(or_default("FRIPLASS_DATA_PATH", "./data/listings.json"));
    let session_path = PathBuf::from(or_default("FRIPLASS_SESSION_PATH", "./data/session.json"));
    let uploads_dir = PathBuf::from(or_default("FRIPLASS_UPLOADS_DIR", "./public/uploads"));
    let uploads_url_prefix = or_default("FRIPLASS_UPLOADS_URL_PREFIX", "/uploads")
        .trim_end_matches('/')
        .to_string();
    let max_upload_bytes = parse_usize("FRIPLASS_MAX_UPLOAD_BYTES", "10485760")?;
    let rate_limit_per_minute = parse_usize("FRIPLASS_RATE_LIMIT_PER_MINUTE", "120")?;

    // An empty secret is treated the same as an unset one.
    let migrate_secret = lookup("MIGRATE_SECRET")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_path,
        session_path,
        uploads_dir,
        uploads_url_prefix,
        max_upload_bytes,
        migrate_secret,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FRIPLASS_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
