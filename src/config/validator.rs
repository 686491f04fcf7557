use crate::error::{AppError, Result};
use crate::fetch::request::{scan_placeholders, Segment};

use super::{Config, EndpointConfig};

const KNOWN_PLACEHOLDERS: &[&str] = &["symbol", "minutes"];

/// Validate a configuration and surface every problem in one message.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_service(config, &mut issues);
    validate_endpoints(&config.service.endpoints, &mut issues);
    validate_dashboard(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "dashboard config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_service(config: &Config, issues: &mut Vec<String>) {
    let base_url = config.service.base_url.trim();
    if base_url.is_empty() {
        issues.push("service.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        issues.push(format!(
            "service.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.service.timeout.is_zero() {
        issues.push("service.timeout_secs must be greater than zero".to_string());
    }

    for name in config.service.headers.keys() {
        if name.trim().is_empty() {
            issues.push("service.headers contains an empty header name".to_string());
        }
    }
}

fn validate_endpoints(endpoints: &EndpointConfig, issues: &mut Vec<String>) {
    let templates = [
        ("instruments", endpoints.instruments.as_str(), &[][..]),
        ("current_price", endpoints.current_price.as_str(), &["symbol"][..]),
        ("history", endpoints.history.as_str(), &["symbol", "minutes"][..]),
    ];

    for (label, template, required) in templates {
        if !template.starts_with('/') {
            issues.push(format!(
                "service.endpoints.{label} must start with `/`, found `{template}`"
            ));
        }

        let placeholders = placeholders(template);
        for placeholder in &placeholders {
            if !KNOWN_PLACEHOLDERS.contains(&placeholder.as_str()) {
                issues.push(format!(
                    "service.endpoints.{label} references unknown placeholder `{{{placeholder}}}`"
                ));
            }
        }
        for needed in required {
            if !placeholders.iter().any(|found| found == needed) {
                issues.push(format!(
                    "service.endpoints.{label} must reference `{{{needed}}}`"
                ));
            }
        }
        if label == "instruments" && !placeholders.is_empty() {
            issues.push("service.endpoints.instruments cannot take placeholders".to_string());
        }
    }
}

fn validate_dashboard(config: &Config, issues: &mut Vec<String>) {
    if config.dashboard.default_window_minutes <= 0 {
        issues.push(format!(
            "dashboard.default_window_minutes must be positive, found {}",
            config.dashboard.default_window_minutes
        ));
    }
}

fn placeholders(template: &str) -> Vec<String> {
    scan_placeholders(template, "{")
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) | Segment::Unterminated(name) => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect()
}
