use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use log::info;

use crate::error::Result;

pub mod loader;
pub mod validator;

pub use loader::load_config;

pub const DEFAULT_CONFIG_PATH: &str = "assets/configs/dashboard.json";
pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

/// URL templates, relative to the base URL. `{symbol}` and `{minutes}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub instruments: String,
    pub current_price: String,
    pub history: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            instruments: "/stocks".to_string(),
            current_price: "/stocks/{symbol}".to_string(),
            history: "/stocks/{symbol}/minutes={minutes}".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Header values may reference `${ENV_VAR}`; they are resolved when the client is built.
    pub headers: HashMap<String, String>,
    pub endpoints: EndpointConfig,
}

/// What to do with a result whose submission has since been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResultPolicy {
    /// Drop results that do not belong to the latest submission.
    #[default]
    Discard,
    /// Last write wins, as long as the result is for the selected symbol.
    Apply,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub default_window_minutes: i64,
    pub stale_results: StaleResultPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn builtin() -> Self {
        let headers = HashMap::from([(
            "Authorization".to_string(),
            "Bearer ${QUOTE_SERVICE_TOKEN}".to_string(),
        )]);

        Config {
            service: ServiceConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                headers,
                endpoints: EndpointConfig::default(),
            },
            dashboard: DashboardConfig {
                default_window_minutes: DEFAULT_WINDOW_MINUTES,
                stale_results: StaleResultPolicy::Discard,
            },
        }
    }

    /// Load from `path`, falling back to the built-in defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No configuration at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::builtin());
        }
        load_config(path)
    }
}
