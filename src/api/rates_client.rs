use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait::async_trait]
pub trait RatesClientTrait {
    /// Fetch the latest USD-based rates as code → rate.
    async fn get_latest_rates(&self) -> Result<HashMap<String, f64>>;
}

#[derive(Clone)]
pub struct RatesClient {
    client: Client,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LatestRates {
    pub rates: HashMap<String, f64>,
    pub base: Option<String>,
    pub date: Option<String>,
}

impl RatesClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl RatesClientTrait for RatesClient {
    async fn get_latest_rates(&self) -> Result<HashMap<String, f64>> {
        tracing::info!(url = %self.url, "Fetching exchange rates");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("API request failed: {} - {}", status, text);
        }

        let latest = parse_latest_rates(&text)?;
        tracing::debug!(
            base = latest.base.as_deref().unwrap_or("?"),
            date = latest.date.as_deref().unwrap_or("?"),
            count = latest.rates.len(),
            "Exchange rates received"
        );
        Ok(latest.rates)
    }
}

/// Parse a `{"rates": {...}, "base": ..., "date": ...}` response body.
pub fn parse_latest_rates(text: &str) -> Result<LatestRates> {
    serde_json::from_str(text).context("Failed to parse exchange rates response")
}
