use anyhow::{Context, Result};
use log::{debug, error, info};
use reqwest::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HOST, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

use crate::config::settings::UpstreamSettings;

pub type QueryParams = Vec<(&'static str, String)>;

/// HTTP client bound to one base URL that logs every request/response pair
#[derive(Clone)]
pub struct LoggingClient {
    client: Client,
    base_url: String,
}

impl LoggingClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self> {
        let client = Self::build_client(settings)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body as JSON. Transport errors and non-2xx
    /// statuses are returned to the caller as they are, nothing is retried.
    pub async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        info!("API Request: GET {} params={:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!("API Request Error: GET {}: {}", url, e);
                e
            })
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        info!("API Response: {} status={}", url, status);
        debug!("API Response body: {}", body);

        if !status.is_success() {
            error!("API Error: {} status={} body={}", url, status, body);
            anyhow::bail!("API returned status: {}", status);
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse JSON from {}", url))
    }

    fn build_client(settings: &UpstreamSettings) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent)
            .default_headers(Self::default_headers(settings));

        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build().context("Failed to build HTTP client")
    }

    fn default_headers(settings: &UpstreamSettings) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        if let Some(host) = settings.host().and_then(|h| HeaderValue::from_str(h).ok()) {
            headers.insert(HOST, host);
        }

        headers
    }
}
