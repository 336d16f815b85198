//! Gateway configuration from environment variables.
//!
//! | Variable            | Default                 |
//! |---------------------|-------------------------|
//! | `ETH_NODE_URL`      | required                |
//! | `HOST`              | `0.0.0.0`               |
//! | `PORT`              | `8080`                  |
//! | `CLEANUP_ENABLED`   | `true`                  |
//! | `CLEANUP_HOURS`     | `24`                    |
//! | `NODE_TIMEOUT_SECS` | `10`                    |
//! | `NODE_BLOCK_TAG`    | `latest`                |
//! | `MAX_BODY_BYTES`    | `1048576`               |
//!
//! A value that does not parse is logged and the default kept. Only a missing
//! node URL stops startup.

use blockman_gateway::GatewayConfig;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration that cannot be defaulted
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("ETH_NODE_URL environment variable is required")]
    MissingNodeUrl,
}

/// Load `.env` from the working directory or one of its parents.
///
/// Variables already present in the process environment are left alone.
/// Returns whether a file was loaded.
pub fn load_env_file() -> bool {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!(path = %path.display(), "Loaded environment file");
            true
        }
        Err(e) => report_env_file_error(e),
    }
}

/// Load variables from a specific env file
pub fn load_env_file_from(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            info!(path = %path.display(), "Loaded environment file");
            true
        }
        Err(e) => report_env_file_error(e),
    }
}

fn report_env_file_error(e: dotenvy::Error) -> bool {
    if e.not_found() {
        debug!("No .env file found");
    } else {
        warn!(error = %e, "Failed to load .env file");
    }
    false
}

/// Load configuration from the process environment
pub fn load_config() -> Result<GatewayConfig, ConfigLoadError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from any key/value source
pub fn load_config_from<F>(lookup: F) -> Result<GatewayConfig, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GatewayConfig::default();

    config.node.url = lookup("ETH_NODE_URL")
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ConfigLoadError::MissingNodeUrl)?;

    if let Some(host) = parse_var::<IpAddr, _>(&lookup, "HOST") {
        config.http.host = host;
    }
    if let Some(port) = parse_var::<u16, _>(&lookup, "PORT") {
        config.http.port = port;
    }

    if let Some(raw) = lookup("CLEANUP_ENABLED") {
        match parse_bool(&raw) {
            Some(enabled) => config.cleanup.enabled = enabled,
            None => warn!(value = %raw, "Invalid CLEANUP_ENABLED value, using default: true"),
        }
    }

    if let Some(raw) = lookup("CLEANUP_HOURS") {
        let secs = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(|hours| hours.checked_mul(60 * 60));
        match secs {
            Some(secs) => config.cleanup.max_age = Duration::from_secs(secs),
            None => warn!(value = %raw, "Invalid CLEANUP_HOURS value, using default: 24"),
        }
    }

    if let Some(secs) = parse_positive(&lookup, "NODE_TIMEOUT_SECS") {
        config.node.request_timeout = Duration::from_secs(secs);
    }

    if let Some(tag) = lookup("NODE_BLOCK_TAG").filter(|t| !t.trim().is_empty()) {
        config.node.block_tag = tag.trim().to_string();
    }

    if let Some(bytes) = parse_positive(&lookup, "MAX_BODY_BYTES") {
        config.limits.max_body_size = bytes as usize;
    }

    if config.cleanup.enabled {
        info!(
            max_age_hours = config.cleanup.max_age.as_secs() / 3600,
            "ABI cleanup enabled"
        );
    }

    Ok(config)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<u64, _>(lookup, key) {
        Some(0) => {
            warn!(key, "Value must be positive, using default");
            None
        }
        other => other,
    }
}

/// Boolean spellings accepted for flags: `1 t T TRUE true True` and their
/// false counterparts.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigLoadError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from(|key| env.get(key).cloned())
    }

    #[test]
    fn test_node_url_required() {
        assert!(matches!(load(&[]), Err(ConfigLoadError::MissingNodeUrl)));
        assert!(matches!(
            load(&[("ETH_NODE_URL", "  ")]),
            Err(ConfigLoadError::MissingNodeUrl)
        ));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ETH_NODE_URL", "http://localhost:8545")]).unwrap();
        assert_eq!(config.node.url, "http://localhost:8545");
        assert_eq!(config.http.port, 8080);
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.max_age, Duration::from_secs(24 * 3600));
        assert_eq!(config.node.block_tag, "latest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ETH_NODE_URL", "https://rpc.example.org"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("CLEANUP_ENABLED", "F"),
            ("CLEANUP_HOURS", "2"),
            ("NODE_TIMEOUT_SECS", "3"),
            ("NODE_BLOCK_TAG", "pending"),
            ("MAX_BODY_BYTES", "2048"),
        ])
        .unwrap();

        assert_eq!(config.http_addr().to_string(), "127.0.0.1:9090");
        assert!(!config.cleanup.enabled);
        assert_eq!(config.cleanup.max_age, Duration::from_secs(2 * 3600));
        assert_eq!(config.node.request_timeout, Duration::from_secs(3));
        assert_eq!(config.node.block_tag, "pending");
        assert_eq!(config.limits.max_body_size, 2048);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[
            ("ETH_NODE_URL", "http://localhost:8545"),
            ("PORT", "eighty"),
            ("CLEANUP_ENABLED", "yes"),
            ("CLEANUP_HOURS", "0"),
            ("NODE_TIMEOUT_SECS", "-1"),
            ("MAX_BODY_BYTES", "0"),
        ])
        .unwrap();

        assert_eq!(config.http.port, 8080);
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.max_age, Duration::from_secs(24 * 3600));
        assert_eq!(config.node.request_timeout, Duration::from_secs(10));
        assert_eq!(config.limits.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_cleanup_hours_overflow_keeps_default() {
        for raw in ["18446744073709551615", "5124095576030432"] {
            let config = load(&[("ETH_NODE_URL", "http://localhost:8545"), ("CLEANUP_HOURS", raw)])
                .unwrap();
            assert_eq!(config.cleanup.max_age, Duration::from_secs(24 * 3600), "{raw}");
        }

        let largest = u64::MAX / 3600;
        let config = load(&[
            ("ETH_NODE_URL", "http://localhost:8545"),
            ("CLEANUP_HOURS", &largest.to_string()),
        ])
        .unwrap();
        assert_eq!(config.cleanup.max_age, Duration::from_secs(largest * 3600));
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "BLOCKMAN_TEST_ENV_FILE_URL=http://from-file:8545\nBLOCKMAN_TEST_ENV_FILE_PORT=9999\n",
        )
        .unwrap();
        std::env::set_var("BLOCKMAN_TEST_ENV_FILE_PORT", "7000");

        assert!(load_env_file_from(&path));
        assert_eq!(
            std::env::var("BLOCKMAN_TEST_ENV_FILE_URL").unwrap(),
            "http://from-file:8545"
        );
        assert_eq!(std::env::var("BLOCKMAN_TEST_ENV_FILE_PORT").unwrap(), "7000");

        assert!(!load_env_file_from(&dir.path().join("missing.env")));
    }

    #[test]
    fn test_parse_bool() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(raw), Some(true));
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(raw), Some(false));
        }
        assert_eq!(parse_bool("tRuE"), None);
        assert_eq!(parse_bool(""), None);
    }
}
