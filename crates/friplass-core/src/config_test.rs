use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FRIPLASS_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_path.to_string_lossy(), "./data/listings.json");
    assert_eq!(cfg.session_path.to_string_lossy(), "./data/session.json");
    assert_eq!(cfg.uploads_dir.to_string_lossy(), "./public/uploads");
    assert_eq!(cfg.uploads_url_prefix, "/uploads");
    assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.rate_limit_per_minute, 120);
    assert!(cfg.migrate_secret.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("FRIPLASS_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRIPLASS_BIND_ADDR"),
        "expected InvalidEnvVar(FRIPLASS_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_upload_limit() {
    let mut map = HashMap::new();
    map.insert("FRIPLASS_MAX_UPLOAD_BYTES", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRIPLASS_MAX_UPLOAD_BYTES"),
        "expected InvalidEnvVar(FRIPLASS_MAX_UPLOAD_BYTES), got: {result:?}"
    );
}

#[test]
fn uploads_url_prefix_trailing_slash_is_trimmed() {
    let mut map = HashMap::new();
    map.insert("FRIPLASS_UPLOADS_URL_PREFIX", "/media/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.uploads_url_prefix, "/media");
}

#[test]
fn blank_migrate_secret_counts_as_unset() {
    let mut map = HashMap::new();
    map.insert("MIGRATE_SECRET", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.migrate_secret.is_none());
}

#[test]
fn migrate_secret_is_redacted_in_debug() {
    let mut map = HashMap::new();
    map.insert("MIGRATE_SECRET", "hunter2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.migrate_secret.as_deref(), Some("hunter2"));
    let dbg = format!("{cfg:?}");
    assert!(!dbg.contains("hunter2"));
    assert!(dbg.contains("[redacted]"));
}
