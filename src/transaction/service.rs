//! Broadcast-and-monitor use case.
//!
//! # Responsibilities
//! - Forward a broadcast request to upstream exactly once
//! - Poll upstream at a fixed interval until the status is terminal
//! - Stop polling on error, on the configured limits, or on shutdown
//!
//! # Design Decisions
//! - No retries: one failed upstream call aborts the whole operation
//! - Unknown statuses keep polling unless `fail_on_unknown_status` is set

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::MonitorConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::transaction::error::TransactionError;
use crate::transaction::types::{
    BroadcastTransactionRequest, BroadcastTransactionResponse, MonitoringStatusResponse,
};
use crate::transaction::upstream::UpstreamApi;

/// Forwarder and status poller over an [`UpstreamApi`].
#[derive(Debug)]
pub struct TransactionService<U> {
    upstream: U,
    monitor: MonitorConfig,
    shutdown: Arc<Shutdown>,
}

impl<U: UpstreamApi> TransactionService<U> {
    pub fn new(upstream: U, monitor: MonitorConfig, shutdown: Arc<Shutdown>) -> Self {
        Self {
            upstream,
            monitor,
            shutdown,
        }
    }

    /// Configured delay between status checks.
    pub fn poll_interval(&self) -> Duration {
        self.monitor.poll_interval()
    }

    /// Submit the transaction to the upstream broadcaster.
    pub async fn forward(
        &self,
        request: &BroadcastTransactionRequest,
    ) -> Result<BroadcastTransactionResponse, TransactionError> {
        match self.upstream.broadcast(request).await {
            Ok(response) => {
                metrics::record_broadcast("ok");
                tracing::info!(
                    symbol = %request.symbol,
                    tx_hash = %response.tx_hash,
                    "Transaction broadcast"
                );
                Ok(response)
            }
            Err(e) => {
                metrics::record_broadcast("error");
                tracing::error!(symbol = %request.symbol, error = %e, "Broadcast failed");
                Err(TransactionError::Forwarding(e))
            }
        }
    }

    /// Poll upstream every `poll_interval` until the status is terminal.
    pub async fn poll_until_terminal(
        &self,
        tx_hash: &str,
        poll_interval: Duration,
    ) -> Result<MonitoringStatusResponse, TransactionError> {
        if tx_hash.is_empty() {
            let err = TransactionError::InvalidInput("tx_hash is empty".to_string());
            tracing::error!(error = %err, "Refusing to monitor transaction");
            return Err(err);
        }

        let started = Instant::now();
        let result = self.poll_loop(tx_hash, poll_interval, started).await;

        let outcome = match &result {
            Ok(rsp) => {
                tracing::info!(
                    tx_hash = %tx_hash,
                    status = %rsp.tx_status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transaction reached terminal status"
                );
                "terminal"
            }
            Err(e) => e.kind(),
        };
        metrics::record_monitoring(outcome, started);

        result
    }

    async fn poll_loop(
        &self,
        tx_hash: &str,
        poll_interval: Duration,
        started: Instant,
    ) -> Result<MonitoringStatusResponse, TransactionError> {
        let mut shutdown = self.shutdown.subscribe();
        let mut attempts: u32 = 0;

        tracing::info!(tx_hash = %tx_hash, "Starting transaction status monitoring");

        loop {
            attempts += 1;

            let rsp = self.upstream.check_status(tx_hash).await.map_err(|source| {
                tracing::error!(tx_hash = %tx_hash, attempt = attempts, error = %source, "Status check failed");
                TransactionError::Polling {
                    tx_hash: tx_hash.to_string(),
                    source,
                }
            })?;

            metrics::record_status_check(&rsp.tx_status);
            tracing::info!(
                tx_hash = %tx_hash,
                status = %rsp.tx_status,
                attempt = attempts,
                "Monitoring info"
            );

            if rsp.tx_status.is_terminal() {
                return Ok(rsp);
            }

            if !rsp.tx_status.is_known() {
                if self.monitor.fail_on_unknown_status {
                    let err = TransactionError::UnknownStatus {
                        tx_hash: tx_hash.to_string(),
                        status: rsp.tx_status.to_string(),
                    };
                    tracing::error!(error = %err, "Aborting monitoring");
                    return Err(err);
                }
                tracing::warn!(
                    tx_hash = %tx_hash,
                    status = %rsp.tx_status,
                    "Unrecognized status, treating as pending"
                );
            }

            let attempts_exhausted =
                self.monitor.max_attempts > 0 && attempts >= self.monitor.max_attempts;
            let wait_exhausted = self
                .monitor
                .max_wait()
                .is_some_and(|max| started.elapsed() + poll_interval > max);
            if attempts_exhausted || wait_exhausted {
                let err = TransactionError::MonitoringExhausted {
                    tx_hash: tx_hash.to_string(),
                    attempts,
                    last_status: rsp.tx_status,
                };
                tracing::error!(error = %err, "Monitoring limit reached");
                return Err(err);
            }

            tokio::select! {
                _ = sleep(poll_interval) => {}
                _ = shutdown.recv() => {
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        last_status = %rsp.tx_status,
                        attempt = attempts,
                        "Shutdown in progress, cancelling monitoring"
                    );
                    return Err(TransactionError::Cancelled { tx_hash: tx_hash.to_string() });
                }
            }
        }
    }
}
