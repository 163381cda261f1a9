//! # Service Configuration
//!
//! Environment-driven configuration for the trace synchronization daemon.
//!
//! ## Overview
//!
//! All settings are read from `TRACESYNC_`-prefixed environment variables
//! with fail-fast validation: missing required credentials abort startup
//! with an actionable message rather than surfacing later as auth failures
//! mid-cycle.
//!
//! Credentials may be given inline (`TRACESYNC_API_USERNAME`) or through a
//! file path (`TRACESYNC_API_USERNAME_FILE`), which fits secret-mount
//! deployments.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TRACESYNC_DATABASE_PATH` | `traces.db` |
//! | `TRACESYNC_API_BASE_URL` | public OSM API |
//! | `TRACESYNC_API_USERNAME[_FILE]` | required |
//! | `TRACESYNC_API_PASSWORD[_FILE]` | required |
//! | `TRACESYNC_USER_AGENT` | `trace-platform/0.1 (+gps-trace-sync)` |
//! | `TRACESYNC_DISCOVERY_ENABLED` | `true` |
//! | `TRACESYNC_DISCOVERY_INTERVAL_SECS` | `60` |
//! | `TRACESYNC_PROBE_DELAY_MS` | `1000` |
//! | `TRACESYNC_LOOKAHEAD_WINDOW` | `10000` |
//! | `TRACESYNC_GPX_SYNC_ENABLED` | `true` |
//! | `TRACESYNC_GPX_SYNC_INTERVAL_SECS` | `10` |
//! | `TRACESYNC_EXPORT_ENABLED` | `true` |
//! | `TRACESYNC_EXPORT_INTERVAL_SECS` | `3600` |
//! | `TRACESYNC_EXPORT_OUTPUT_PATH` | `tracks.geojson` |
//! | `TRACESYNC_EXPORT_MAX_TRACKS` | unbounded |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ServiceError};

/// Environment variable prefix
const ENV_PREFIX: &str = "TRACESYNC_";

/// Complete configuration of the daemon
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Trace API base URL; `None` uses the public OSM API
    pub api_base_url: Option<String>,

    /// Basic auth credentials for the trace API
    pub api_username: String,
    pub api_password: String,

    /// User-Agent sent with every API request
    pub user_agent: String,

    /// Discovery loop
    pub discovery_enabled: bool,
    pub discovery_interval: Duration,
    pub probe_delay: Duration,
    pub lookahead_window: i64,

    /// Payload sync loop
    pub gpx_sync_enabled: bool,
    pub gpx_sync_interval: Duration,

    /// Export loop
    pub export_enabled: bool,
    pub export_interval: Duration,
    pub export_output_path: PathBuf,
    pub export_max_tracks: Option<i64>,
}

impl ServiceConfig {
    /// Load the configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when required credentials are missing, a credential
    /// file cannot be read, or a value fails to parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    ///
    /// Extracted from [`from_env`](Self::from_env) so tests can inject
    /// variables without mutating process state.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let api_username = required_secret(&var, "API_USERNAME")?;
        let api_password = required_secret(&var, "API_PASSWORD")?;

        Ok(Self {
            database_path: var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("traces.db")),
            api_base_url: var("API_BASE_URL"),
            api_username,
            api_password,
            user_agent: var("USER_AGENT")
                .unwrap_or_else(|| "trace-platform/0.1 (+gps-trace-sync)".to_string()),

            discovery_enabled: parse_flag(&var, "DISCOVERY_ENABLED", true)?,
            discovery_interval: Duration::from_secs(parse_number(
                &var,
                "DISCOVERY_INTERVAL_SECS",
                60,
            )?),
            probe_delay: Duration::from_millis(parse_number(&var, "PROBE_DELAY_MS", 1_000)?),
            lookahead_window: parse_number(&var, "LOOKAHEAD_WINDOW", 10_000)?,

            gpx_sync_enabled: parse_flag(&var, "GPX_SYNC_ENABLED", true)?,
            gpx_sync_interval: Duration::from_secs(parse_number(
                &var,
                "GPX_SYNC_INTERVAL_SECS",
                10,
            )?),

            export_enabled: parse_flag(&var, "EXPORT_ENABLED", true)?,
            export_interval: Duration::from_secs(parse_number(
                &var,
                "EXPORT_INTERVAL_SECS",
                3_600,
            )?),
            export_output_path: var("EXPORT_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("tracks.geojson")),
            export_max_tracks: var("EXPORT_MAX_TRACKS")
                .map(|raw| {
                    raw.parse::<i64>().map_err(|_| {
                        ServiceError::Config(format!(
                            "TRACESYNC_EXPORT_MAX_TRACKS is not a number: {}",
                            raw
                        ))
                    })
                })
                .transpose()?,
        })
    }
}

/// Resolve a required credential from `<NAME>` or `<NAME>_FILE`
fn required_secret(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String> {
    if let Some(value) = var(name) {
        return Ok(value);
    }

    if let Some(path) = var(&format!("{}_FILE", name)) {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            ServiceError::Config(format!("cannot read {}{}_FILE ({}): {}", ENV_PREFIX, name, path, e))
        })?;
        return Ok(contents.trim().to_string());
    }

    Err(ServiceError::Config(format!(
        "missing required setting: set {prefix}{name} or {prefix}{name}_FILE",
        prefix = ENV_PREFIX,
        name = name
    )))
}

fn parse_flag(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool> {
    match var(name) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ServiceError::Config(format!(
                "{}{} is not a boolean: {}",
                ENV_PREFIX, name, other
            ))),
        },
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| {
            ServiceError::Config(format!("{}{} is not a number: {}", ENV_PREFIX, name, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_inline_credentials() {
        let lookup = lookup_from(&[
            ("TRACESYNC_API_USERNAME", "alice"),
            ("TRACESYNC_API_PASSWORD", "secret"),
        ]);

        let config = ServiceConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.api_username, "alice");
        assert_eq!(config.database_path, PathBuf::from("traces.db"));
        assert_eq!(config.lookahead_window, 10_000);
        assert_eq!(config.probe_delay, Duration::from_millis(1_000));
        assert!(config.discovery_enabled);
        assert!(config.export_max_tracks.is_none());
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let lookup = lookup_from(&[("TRACESYNC_API_USERNAME", "alice")]);

        let err = ServiceConfig::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("TRACESYNC_API_PASSWORD"));
    }

    #[test]
    fn test_credentials_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  hunter2  ").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let lookup = lookup_from(&[
            ("TRACESYNC_API_USERNAME", "alice"),
            ("TRACESYNC_API_PASSWORD_FILE", path.as_str()),
        ]);

        let config = ServiceConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.api_password, "hunter2");
    }

    #[test]
    fn test_overrides_and_flags() {
        let lookup = lookup_from(&[
            ("TRACESYNC_API_USERNAME", "alice"),
            ("TRACESYNC_API_PASSWORD", "secret"),
            ("TRACESYNC_DISCOVERY_ENABLED", "off"),
            ("TRACESYNC_LOOKAHEAD_WINDOW", "500"),
            ("TRACESYNC_EXPORT_MAX_TRACKS", "250"),
            ("TRACESYNC_EXPORT_OUTPUT_PATH", "/var/data/out.geojson"),
        ]);

        let config = ServiceConfig::from_lookup(&lookup).unwrap();
        assert!(!config.discovery_enabled);
        assert_eq!(config.lookahead_window, 500);
        assert_eq!(config.export_max_tracks, Some(250));
        assert_eq!(
            config.export_output_path,
            PathBuf::from("/var/data/out.geojson")
        );
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let lookup = lookup_from(&[
            ("TRACESYNC_API_USERNAME", "alice"),
            ("TRACESYNC_API_PASSWORD", "secret"),
            ("TRACESYNC_GPX_SYNC_ENABLED", "maybe"),
        ]);

        assert!(ServiceConfig::from_lookup(&lookup).is_err());
    }
}
