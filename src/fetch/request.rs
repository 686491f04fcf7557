use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, FetchError, Result};

use super::FetchResult;

/// Values substituted into an endpoint template.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestContext<'a> {
    pub symbol: Option<&'a str>,
    pub window_minutes: Option<u32>,
}

pub fn endpoint_url(
    base_url: &str,
    template: &str,
    context: RequestContext<'_>,
) -> FetchResult<String> {
    let mut replacements: HashMap<&str, String> = HashMap::new();
    if let Some(symbol) = context.symbol {
        replacements.insert("symbol", encode_path_segment(symbol)?);
    }
    if let Some(minutes) = context.window_minutes {
        replacements.insert("minutes", minutes.to_string());
    }

    let path = render_template(template, &replacements)?;
    Ok(format!("{}{}", base_url.trim_end_matches('/'), path))
}

/// Percent-encode a value so it stays within one path segment.
fn encode_path_segment(value: &str) -> FetchResult<String> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(FetchError::validation(format!(
            "`{value}` cannot be used as a symbol"
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// A piece of a template split on `open ... }` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
    /// An opener with no closing brace; holds the text after the opener.
    Unterminated(&'a str),
}

/// Split `template` into literals and placeholders opened by `open`
/// (`"{"` for endpoint templates, `"${"` for environment references).
pub fn scan_placeholders<'a>(template: &'a str, open: &str) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(open) {
        if start > 0 {
            segments.push(Segment::Literal(&rest[..start]));
        }
        let after = &rest[start + open.len()..];
        match after.find('}') {
            Some(end) => {
                segments.push(Segment::Placeholder(&after[..end]));
                rest = &after[end + 1..];
            }
            None => {
                segments.push(Segment::Unterminated(after));
                return segments;
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Expand `${NAME}` placeholders from the process environment.
pub fn expand_env_vars(value: &str) -> Result<String> {
    let mut result = String::with_capacity(value.len());

    for segment in scan_placeholders(value, "${") {
        match segment {
            Segment::Literal(text) => result.push_str(text),
            Segment::Placeholder("") => {
                return Err(AppError::message(
                    "Encountered empty environment placeholder in header",
                ))
            }
            Segment::Placeholder(name) => {
                let resolved = std::env::var(name).map_err(|_| {
                    AppError::message(format!(
                        "Environment variable {name} required by request header is not set"
                    ))
                })?;
                result.push_str(&resolved);
            }
            Segment::Unterminated(_) => {
                return Err(AppError::message(
                    "Unterminated environment placeholder in header",
                ))
            }
        }
    }

    Ok(result)
}

pub fn render_template(template: &str, replacements: &HashMap<&str, String>) -> FetchResult<String> {
    let mut result = String::with_capacity(template.len());

    for segment in scan_placeholders(template, "{") {
        match segment {
            Segment::Literal(text) => result.push_str(text),
            Segment::Placeholder(key) => {
                let value = replacements.get(key).ok_or_else(|| {
                    FetchError::validation(format!(
                        "No replacement provided for placeholder `{key}` in template"
                    ))
                })?;
                result.push_str(value);
            }
            Segment::Unterminated(key) => {
                return Err(FetchError::validation(format!(
                    "Unterminated placeholder in template: {{{key}"
                )))
            }
        }
    }

    Ok(result)
}

/// Resolve configured headers once; credentials stay opaque past this point.
pub fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| AppError::message(format!("Invalid header name: {key}")))?;
        let expanded = expand_env_vars(value)?;
        let header_value = HeaderValue::from_str(&expanded)
            .map_err(|_| AppError::message(format!("Invalid header value for {key}")))?;
        map.insert(name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_history_endpoint() {
        let url = endpoint_url(
            "http://quotes.local/api/",
            "/stocks/{symbol}/minutes={minutes}",
            RequestContext {
                symbol: Some("NVDA"),
                window_minutes: Some(50),
            },
        )
        .unwrap();

        assert_eq!(url, "http://quotes.local/api/stocks/NVDA/minutes=50");
    }

    #[test]
    fn symbol_cannot_escape_its_path_segment() {
        let url = endpoint_url(
            "http://quotes.local",
            "/stocks/{symbol}/minutes={minutes}",
            RequestContext {
                symbol: Some("../x?minutes=1"),
                window_minutes: Some(5),
            },
        )
        .unwrap();
        assert_eq!(url, "http://quotes.local/stocks/..%2Fx%3Fminutes%3D1/minutes=5");

        let err = endpoint_url(
            "http://quotes.local",
            "/stocks/{symbol}",
            RequestContext {
                symbol: Some(".."),
                window_minutes: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
    }

    #[test]
    fn scanner_splits_literals_and_placeholders() {
        assert_eq!(
            scan_placeholders("/stocks/{symbol}/x", "{"),
            vec![
                Segment::Literal("/stocks/"),
                Segment::Placeholder("symbol"),
                Segment::Literal("/x"),
            ]
        );
        assert_eq!(
            scan_placeholders("Bearer ${TOKEN", "${"),
            vec![Segment::Literal("Bearer "), Segment::Unterminated("TOKEN")]
        );
    }

    #[test]
    fn missing_placeholder_value_is_rejected() {
        let replacements = HashMap::new();
        let err = render_template("/stocks/{symbol}", &replacements).unwrap_err();
        assert!(err.to_string().contains("symbol"), "unexpected error: {err}");
        assert!(render_template("/stocks/{symbol", &replacements).is_err());
    }

    #[test]
    fn expands_environment_placeholders() {
        std::env::set_var("QUOTE_DASHBOARD_TEST_TOKEN", "abc123");
        let expanded = expand_env_vars("Bearer ${QUOTE_DASHBOARD_TEST_TOKEN}").unwrap();
        assert_eq!(expanded, "Bearer abc123");

        assert!(expand_env_vars("Bearer ${QUOTE_DASHBOARD_UNSET_VARIABLE}").is_err());
        assert!(expand_env_vars("Bearer ${}").is_err());
    }

    #[test]
    fn builds_literal_headers() {
        let headers = HashMap::from([("Accept".to_string(), "application/json".to_string())]);
        let map = build_headers(&headers).unwrap();
        assert_eq!(map.get("accept").unwrap(), "application/json");

        let bad = HashMap::from([("Bad Header".to_string(), "x".to_string())]);
        assert!(build_headers(&bad).is_err());
    }
}
