//! HTTP fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use super::RemoteFetcher;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Fetches collection routes over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Creates a fetcher using the request timeout and user agent from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Wraps an already configured client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let start = Instant::now();
        let url = Url::parse(url).map_err(|e| CacheError::InvalidRoute(format!("{}: {}", url, e)))?;

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| CacheError::Parse(format!("invalid JSON from {}: {}", url, e)))?;

        debug!(
            "fetched {} in {}ms ({} bytes)",
            url,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(body)
    }
}
