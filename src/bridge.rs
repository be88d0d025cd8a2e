// SPDX-License-Identifier: GPL-3.0-only

//! Client side of the counter service
//!
//! Used by the capture session to read the global count on start-up and to
//! report each capture.

use crate::config::ClientConfig;
use crate::errors::CounterError;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Count body as sent by the service; tolerant of a missing field
#[derive(Debug, Deserialize)]
struct MaybeCount {
    count: Option<u64>,
}

/// HTTP client for the counter service
#[derive(Debug, Clone)]
pub struct CounterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CounterClient {
    /// Client for the service mounted at `base_url` (including its path prefix)
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CounterError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, CounterError> {
        Self::new(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Liveness probe
    pub async fn health(&self) -> Result<(), CounterError> {
        let response = self
            .http
            .get(self.url("/health"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        check_status(response.status())
    }

    /// Current global count
    pub async fn fetch_count(&self) -> Result<u64, CounterError> {
        let request = self
            .http
            .get(self.url("/capture-count"))
            .bearer_auth(&self.api_key);
        self.send_for_count(request).await
    }

    /// Report one capture; returns the new global count
    pub async fn increment(&self) -> Result<u64, CounterError> {
        let request = self
            .http
            .post(self.url("/capture-count/increment"))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send_for_count(request).await
    }

    async fn send_for_count(&self, request: reqwest::RequestBuilder) -> Result<u64, CounterError> {
        let response = request.send().await?;
        check_status(response.status())?;

        let body: MaybeCount = response
            .json()
            .await
            .map_err(|e| CounterError::InvalidResponse(e.to_string()))?;
        let count = body
            .count
            .ok_or_else(|| CounterError::InvalidResponse("missing count".to_string()))?;

        debug!(count, "Counter service responded");
        Ok(count)
    }
}

fn check_status(status: StatusCode) -> Result<(), CounterError> {
    if status == StatusCode::UNAUTHORIZED {
        Err(CounterError::Unauthorized)
    } else if !status.is_success() {
        Err(CounterError::Transport(format!("HTTP {}", status)))
    } else {
        Ok(())
    }
}
