//! HTTP client for the upstream broadcaster.
//!
//! Endpoints:
//! - POST {address}/broadcast
//! - GET {address}/check/{tx_hash}
//!
//! # Responsibilities
//! - Build endpoint URLs from the configured base address
//! - Apply the per-call timeout to every request
//! - Decode JSON bodies regardless of HTTP status

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::UpstreamConfig;
use crate::transaction::error::UpstreamError;
use crate::transaction::types::{
    BroadcastTransactionRequest, BroadcastTransactionResponse, MonitoringStatusResponse,
};

/// Operations the transaction service needs from upstream.
pub trait UpstreamApi: Send + Sync {
    /// Submit a transaction for broadcast.
    fn broadcast(
        &self,
        request: &BroadcastTransactionRequest,
    ) -> impl Future<Output = Result<BroadcastTransactionResponse, UpstreamError>> + Send;

    /// Fetch the current status of a broadcast transaction.
    fn check_status(
        &self,
        tx_hash: &str,
    ) -> impl Future<Output = Result<MonitoringStatusResponse, UpstreamError>> + Send;
}

/// reqwest-backed [`UpstreamApi`].
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base: Url = config.address.parse().map_err(|e| {
            UpstreamError::InvalidUrl(format!("'{}': {}", config.address, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(config.address.clone()));
        }

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Read the whole body and decode it, whatever the status code.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Decode { status, source })
    }
}

impl UpstreamApi for UpstreamClient {
    async fn broadcast(
        &self,
        request: &BroadcastTransactionRequest,
    ) -> Result<BroadcastTransactionResponse, UpstreamError> {
        let url = self.endpoint(&["broadcast"])?;

        let response = self
            .client
            .post(url)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await?;

        tracing::info!(status = response.status().as_u16(), "Upstream broadcast responded");

        Self::decode(response).await
    }

    async fn check_status(&self, tx_hash: &str) -> Result<MonitoringStatusResponse, UpstreamError> {
        let url = self.endpoint(&["check", tx_hash])?;

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        tracing::debug!(
            tx_hash = %tx_hash,
            status = response.status().as_u16(),
            "Upstream status check responded"
        );

        Self::decode(response).await
    }
}
