//! Reporter configuration.
//!
//! Defaults target the in-cluster portal. Environment variables override the
//! defaults; the CLI overrides both.

use crate::endpoints::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::reporters::ReporterKind;
use std::collections::HashSet;
use std::time::Duration;

/// Port the embedded `/metrics` server listens on.
pub const DEFAULT_METRICS_PORT: u16 = 18000;

/// How often the background thread snapshots the game.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Portal base URL, endpoints are appended to it
    pub base_url: String,

    /// Port for the Prometheus text endpoint
    pub metrics_port: u16,

    /// Interval between telemetry ticks
    pub tick_interval: Duration,

    /// Timeout applied to every portal request
    pub request_timeout: Duration,

    /// Reporters that should never post
    pub disabled: HashSet<ReporterKind>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            disabled: HashSet::new(),
        }
    }
}

impl PortalConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("PORTAL_BASE_URL") {
            config.set_base_url("PORTAL_BASE_URL", &url)?;
        }
        if let Some(port) = lookup("PORTAL_METRICS_PORT") {
            config.metrics_port = parse_number("PORTAL_METRICS_PORT", &port)?;
        }
        if let Some(ms) = lookup("PORTAL_TICK_MS") {
            config.set_tick_ms("PORTAL_TICK_MS", parse_number("PORTAL_TICK_MS", &ms)?)?;
        }
        if let Some(ms) = lookup("PORTAL_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(parse_number("PORTAL_TIMEOUT_MS", &ms)?);
        }
        if let Some(list) = lookup("PORTAL_DISABLE") {
            config.disabled = parse_disabled(&list)?;
        }

        Ok(config)
    }

    /// Validate and set the base URL. `name` is the variable or flag the
    /// value came from, for the error message.
    pub fn set_base_url(&mut self, name: &'static str, url: &str) -> Result<(), ConfigError> {
        self.base_url = parse_base_url(name, url)?;
        Ok(())
    }

    pub fn set_tick_ms(&mut self, name: &'static str, ms: u64) -> Result<(), ConfigError> {
        if ms == 0 {
            return Err(ConfigError::InvalidValue {
                name,
                value: "0".to_string(),
                reason: "tick interval must be positive".to_string(),
            });
        }
        self.tick_interval = Duration::from_millis(ms);
        Ok(())
    }

    pub fn is_enabled(&self, kind: ReporterKind) -> bool {
        !self.disabled.contains(&kind)
    }
}

fn parse_base_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Comma-separated reporter names, e.g. `"pack,gamestats"`.
pub fn parse_disabled(list: &str) -> Result<HashSet<ReporterKind>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            ReporterKind::from_name(name).ok_or_else(|| ConfigError::UnknownReporter(name.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_target_cluster_portal() {
        let config = PortalConfig::default();
        assert_eq!(config.base_url, "http://portal-service.portal:5000");
        assert_eq!(config.metrics_port, 18000);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert!(config.disabled.is_empty());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("PORTAL_BASE_URL", "http://localhost:5000/"),
            ("PORTAL_METRICS_PORT", "8000"),
            ("PORTAL_TICK_MS", "250"),
            ("PORTAL_TIMEOUT_MS", "500"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.metrics_port, 8000);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_port_is_rejected_with_variable_name() {
        let err = PortalConfig::from_lookup(lookup_from(&[("PORTAL_METRICS_PORT", "99999")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORTAL_METRICS_PORT"));
    }

    #[test]
    fn test_zero_tick_is_rejected() {
        assert!(PortalConfig::from_lookup(lookup_from(&[("PORTAL_TICK_MS", "0")])).is_err());
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        assert!(
            PortalConfig::from_lookup(lookup_from(&[("PORTAL_BASE_URL", "portal:5000")])).is_err()
        );
    }

    #[test]
    fn test_disable_list_parses_reporter_names() {
        let config = PortalConfig::from_lookup(lookup_from(&[(
            "PORTAL_DISABLE",
            "gamestats, metrics",
        )]))
        .unwrap();

        assert!(!config.is_enabled(ReporterKind::GameStats));
        assert!(!config.is_enabled(ReporterKind::FlatMetrics));
        assert!(config.is_enabled(ReporterKind::Player));
    }

    #[test]
    fn test_flag_overrides_are_validated_like_env() {
        let mut config = PortalConfig::default();

        let err = config.set_base_url("--base-url", "portal:5000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "--base-url", .. }));
        assert_eq!(config.base_url, "http://portal-service.portal:5000");

        let err = config.set_tick_ms("--tick-ms", 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "--tick-ms", .. }));

        config.set_base_url("--base-url", " https://portal.example/ ").unwrap();
        config.set_tick_ms("--tick-ms", 250).unwrap();
        assert_eq!(config.base_url, "https://portal.example");
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_reporter_name_is_an_error() {
        assert!(matches!(
            parse_disabled("player,weather"),
            Err(ConfigError::UnknownReporter(name)) if name == "weather"
        ));
    }
}
