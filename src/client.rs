//! HTTP client for the metrics backend.
//!
//! Thin typed wrapper over `reqwest`: one method per endpoint, JSON bodies,
//! no retries. A failing request aborts only the chain that issued it for the
//! current poll cycle; retrying any sooner than the next scheduled poll would
//! just hammer a backend that is already struggling.

use crate::error::DashError;
use crate::types::{AnomaliesResponse, ForecastResponse, HealthResponse, MetricsResponse};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the dashboard backend. Cheap to clone (wraps an `Arc`'d pool).
#[derive(Debug, Clone)]
pub struct DashClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashClient {
    /// Create a client for the given base URL, e.g. `http://localhost:8000`.
    /// A trailing slash on the base URL is tolerated.
    pub fn new(base_url: impl Into<String>) -> Result<Self, DashError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DashError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DashError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and decode one endpoint. Distinguishes the three failure classes:
    /// transport errors, non-success HTTP statuses, and bodies that are not
    /// the expected JSON shape.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, DashError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!(%url, "fetching");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| DashError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashError::HttpStatus { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| DashError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| DashError::MalformedResponse {
            url,
            reason: e.to_string(),
        })
    }

    /// `GET /metrics?n={window}` — the last `window` monthly KPI buckets.
    pub async fn metrics(&self, window: usize) -> Result<MetricsResponse, DashError> {
        self.get_json(&format!("/metrics?n={window}")).await
    }

    /// `GET /forecast` — monthly leads forecast continuing after the
    /// historical series.
    pub async fn forecast(&self) -> Result<ForecastResponse, DashError> {
        self.get_json("/forecast").await
    }

    /// `GET /anomalies?metric={metric}&k={threshold}` — months whose metric
    /// z-score exceeds the threshold in absolute value.
    pub async fn anomalies(
        &self,
        metric: &str,
        threshold: f64,
    ) -> Result<AnomaliesResponse, DashError> {
        self.get_json(&format!("/anomalies?metric={metric}&k={threshold}"))
            .await
    }

    /// `GET /health` — one-shot reachability probe, used at startup.
    pub async fn health(&self) -> Result<HealthResponse, DashError> {
        self.get_json("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = DashClient::new("http://localhost:8000///").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
