use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

use super::{
    validator, Config, DashboardConfig, EndpointConfig, ServiceConfig, StaleResultPolicy,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_WINDOW_MINUTES,
};

/// Read, convert and validate a dashboard configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read dashboard config at {}", path.display()))?;

    parse_config(&json)
        .with_context(|| format!("invalid dashboard config at {}", path.display()))
        .map_err(AppError::from)
}

pub fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)?;
    let config = raw.into_config()?;
    validator::validate_config(&config)?;
    Ok(config)
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawServiceConfig,
    #[serde(default)]
    dashboard: RawDashboardConfig,
}

impl RawConfig {
    fn into_config(self) -> Result<Config> {
        Ok(Config {
            service: self.service.into_service_config(),
            dashboard: self.dashboard.into_dashboard_config()?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawServiceConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    headers: Option<HashMap<String, String>>,
    #[serde(default)]
    endpoints: RawEndpoints,
}

impl RawServiceConfig {
    fn into_service_config(self) -> ServiceConfig {
        let headers = self
            .headers
            .unwrap_or_else(|| Config::builtin().service.headers);

        ServiceConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            headers,
            endpoints: self.endpoints.into_endpoints(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawEndpoints {
    instruments: Option<String>,
    current_price: Option<String>,
    history: Option<String>,
}

impl RawEndpoints {
    fn into_endpoints(self) -> EndpointConfig {
        let defaults = EndpointConfig::default();
        EndpointConfig {
            instruments: self.instruments.unwrap_or(defaults.instruments),
            current_price: self.current_price.unwrap_or(defaults.current_price),
            history: self.history.unwrap_or(defaults.history),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawDashboardConfig {
    default_window_minutes: Option<i64>,
    stale_results: Option<String>,
}

impl RawDashboardConfig {
    fn into_dashboard_config(self) -> Result<DashboardConfig> {
        let stale_results = match self.stale_results.as_deref() {
            None => StaleResultPolicy::default(),
            Some(value) => parse_stale_policy(value)?,
        };

        Ok(DashboardConfig {
            default_window_minutes: self
                .default_window_minutes
                .unwrap_or(DEFAULT_WINDOW_MINUTES),
            stale_results,
        })
    }
}

fn parse_stale_policy(value: &str) -> Result<StaleResultPolicy> {
    match value.trim().to_lowercase().as_str() {
        "discard" => Ok(StaleResultPolicy::Discard),
        "apply" => Ok(StaleResultPolicy::Apply),
        other => Err(AppError::message(format!(
            "unsupported dashboard.stale_results `{other}` (expected `discard` or `apply`)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("{}").expect("defaults");

        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.timeout, Duration::from_secs(10));
        assert_eq!(config.service.endpoints, EndpointConfig::default());
        assert_eq!(config.dashboard.default_window_minutes, 30);
        assert_eq!(config.dashboard.stale_results, StaleResultPolicy::Discard);
        assert!(config.service.headers.contains_key("Authorization"));
    }

    #[test]
    fn reads_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "service": {{
                    "base_url": "http://localhost:8080",
                    "timeout_secs": 3,
                    "headers": {{}},
                    "endpoints": {{ "history": "/stocks/{{symbol}}?minutes={{minutes}}" }}
                }},
                "dashboard": {{ "default_window_minutes": 15, "stale_results": "apply" }}
            }}"#
        )
        .expect("write config");

        let config = load_config(file.path()).expect("load config");

        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.service.timeout, Duration::from_secs(3));
        assert!(config.service.headers.is_empty());
        assert_eq!(
            config.service.endpoints.history,
            "/stocks/{symbol}?minutes={minutes}"
        );
        assert_eq!(config.service.endpoints.instruments, "/stocks");
        assert_eq!(config.dashboard.default_window_minutes, 15);
        assert_eq!(config.dashboard.stale_results, StaleResultPolicy::Apply);
    }

    #[test]
    fn rejects_unknown_stale_policy() {
        let err = parse_config(r#"{"dashboard": {"stale_results": "sometimes"}}"#)
            .expect_err("policy should be rejected");
        assert!(
            err.to_string().contains("stale_results"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::load(dir.path().join("absent.json")).expect("builtin");
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
    }
}
