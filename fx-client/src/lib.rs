//! # FX Client
//!
//! Remote side of the exchange-rate cache:
//! - `ExchangeRateClient` implements `RemoteRateSource` over the
//!   exchangerate-api v6 HTTP contract
//! - `NetworkProbe` / `FixedConnectivity` implement `Connectivity`

mod probe;

pub use probe::{FixedConnectivity, NetworkProbe};

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use fx_types::{CurrencyCode, FetchError, RateTable, RemoteRateSource};

/// Default API root; requests go to `{root}/{api_key}/latest/{BASE}`.
pub const DEFAULT_API_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Body of `GET /latest/{base}`.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
}

/// Exchange-rate API client.
pub struct ExchangeRateClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl ExchangeRateClient {
    /// Creates a new client against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    /// Points the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, FetchError> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a probe that checks reachability of this client's API host.
    pub fn connectivity_probe(&self, timeout: Duration) -> Option<NetworkProbe> {
        NetworkProbe::for_url(&self.base_url, timeout)
    }

    fn latest_url(&self, base: &CurrencyCode) -> String {
        format!("{}/{}/latest/{}", self.base_url, self.api_key, base)
    }

    fn parse_body(base: &CurrencyCode, body: &str) -> Result<RateTable, FetchError> {
        let parsed: LatestRatesResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Payload(e.to_string()))?;

        if parsed.result.as_deref() == Some("error") {
            return Err(FetchError::Api(
                parsed.error_type.unwrap_or_else(|| "unknown-error".to_string()),
            ));
        }

        let raw = parsed
            .conversion_rates
            .ok_or_else(|| FetchError::Payload("missing conversion_rates".into()))?;

        let mut table = RateTable::new();
        for (code, rate) in raw {
            match CurrencyCode::parse(&code) {
                Some(target) => {
                    if !table.insert(target, rate) {
                        debug!(%base, target = %code, rate, "Dropping unusable rate");
                    }
                }
                None => debug!(%base, target = %code, "Dropping malformed currency code"),
            }
        }

        if table.is_empty() {
            return Err(FetchError::Payload(format!("no usable rates for {}", base)));
        }
        Ok(table)
    }
}

#[async_trait]
impl RemoteRateSource for ExchangeRateClient {
    #[instrument(skip_all, fields(base = %base))]
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
        let resp = self
            .http
            .get(self.latest_url(base))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Rate request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let table = Self::parse_body(base, &body)?;
        debug!(rates = table.len(), "Rates received");
        Ok(table)
    }
}
