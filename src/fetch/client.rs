use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};

use crate::config::{EndpointConfig, ServiceConfig};
use crate::error::{Context, FetchError, Result};

use super::decode::{decode_catalog, decode_current_price, decode_history};
use super::request::{build_headers, endpoint_url, RequestContext};
use super::{FetchResult, Instrument, PriceSample, QuoteService};

/// `QuoteService` backed by the HTTP evaluation endpoints.
pub struct HttpQuoteClient {
    client: Client,
    base_url: String,
    endpoints: EndpointConfig,
}

impl HttpQuoteClient {
    pub fn new(service: &ServiceConfig) -> Result<Self> {
        let headers = build_headers(&service.headers)?;
        let client = Client::builder()
            .timeout(service.timeout)
            .default_headers(headers)
            .build()
            .context("Failed to construct quote service HTTP client")?;

        Ok(Self {
            client,
            base_url: service.base_url.clone(),
            endpoints: service.endpoints.clone(),
        })
    }

    async fn get_text(&self, url: &str, symbol: Option<&str>) -> FetchResult<String> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, symbol));
        }

        response
            .text()
            .await
            .map_err(|err| FetchError::from_reqwest(&err))
    }
}

#[async_trait]
impl QuoteService for HttpQuoteClient {
    async fn list_instruments(&self) -> FetchResult<Vec<Instrument>> {
        let url = endpoint_url(
            &self.base_url,
            &self.endpoints.instruments,
            RequestContext::default(),
        )?;
        let body = self.get_text(&url, None).await?;
        decode_catalog(&body)
    }

    async fn current_price(&self, symbol: &str) -> FetchResult<PriceSample> {
        let url = endpoint_url(
            &self.base_url,
            &self.endpoints.current_price,
            RequestContext {
                symbol: Some(symbol),
                window_minutes: None,
            },
        )?;
        let body = self.get_text(&url, Some(symbol)).await?;
        decode_current_price(&body)
    }

    async fn history(&self, symbol: &str, window_minutes: u32) -> FetchResult<Vec<PriceSample>> {
        let url = endpoint_url(
            &self.base_url,
            &self.endpoints.history,
            RequestContext {
                symbol: Some(symbol),
                window_minutes: Some(window_minutes),
            },
        )?;
        let body = self.get_text(&url, Some(symbol)).await?;
        decode_history(&body)
    }
}

/// Non-2xx statuses: 404 on a symbol endpoint means the symbol is unknown.
fn classify_status(status: StatusCode, symbol: Option<&str>) -> FetchError {
    match (status, symbol) {
        (StatusCode::NOT_FOUND, Some(symbol)) => FetchError::NotFound(symbol.to_string()),
        (StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT, _) => {
            FetchError::transport(format!("upstream timed out with status {status}"))
        }
        _ => FetchError::service(format!("request failed with status {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn not_found_maps_to_symbol_kind_only_on_symbol_endpoints() {
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, Some("ZZZZ")),
            FetchError::NotFound("ZZZZ".to_string())
        );
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, None),
            FetchError::Service(_)
        ));
    }

    #[test]
    fn error_statuses_split_between_service_and_transport() {
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, Some("AAPL")),
            FetchError::Service(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None),
            FetchError::Service(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::GATEWAY_TIMEOUT, Some("AAPL")),
            FetchError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_service_reports_transport_error() {
        let mut config = Config::builtin();
        config.service.base_url = "http://127.0.0.1:9".to_string();
        config.service.headers.clear();
        let client = HttpQuoteClient::new(&config.service).unwrap();

        let err = client.current_price("AAPL").await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)), "unexpected error: {err}");
    }
}
