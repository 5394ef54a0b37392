//! Error definitions for the broadcast-and-monitor flow.

use thiserror::Error;

use crate::transaction::types::TransactionStatus;

/// Errors talking to the upstream broadcaster.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Configured base address cannot carry path segments.
    #[error("invalid upstream address: {0}")]
    InvalidUrl(String),

    /// Connection, timeout or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a body that is not the expected JSON.
    #[error("could not decode upstream response (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the transaction service and the request handler.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Inbound request failed field validation.
    #[error("{0}")]
    Validation(String),

    /// Precondition violated before any upstream call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Broadcast call failed.
    #[error("failed to forward transaction: {0}")]
    Forwarding(#[source] UpstreamError),

    /// A status check failed; monitoring is aborted.
    #[error("failed to check status of transaction {tx_hash}: {source}")]
    Polling {
        tx_hash: String,
        #[source]
        source: UpstreamError,
    },

    /// Upstream reported a status outside the known set while strict mode is on.
    #[error("unrecognized status {status:?} for transaction {tx_hash}")]
    UnknownStatus { tx_hash: String, status: String },

    /// Attempt or wall-clock limit hit before a terminal status.
    #[error("transaction {tx_hash} still {last_status} after {attempts} status checks")]
    MonitoringExhausted {
        tx_hash: String,
        attempts: u32,
        last_status: TransactionStatus,
    },

    /// Shutdown began while monitoring.
    #[error("monitoring of transaction {tx_hash} cancelled by shutdown")]
    Cancelled { tx_hash: String },

    #[error("requested item not found")]
    NotFound,

    #[error("item already exists")]
    Conflict,

    #[error("internal server error")]
    InternalServerError,
}

impl TransactionError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidInput(_) => "invalid_input",
            Self::Forwarding(_) => "forwarding",
            Self::Polling { .. } => "polling",
            Self::UnknownStatus { .. } => "unknown_status",
            Self::MonitoringExhausted { .. } => "exhausted",
            Self::Cancelled { .. } => "cancelled",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InternalServerError => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransactionError::MonitoringExhausted {
            tx_hash: "0xabc".into(),
            attempts: 3,
            last_status: TransactionStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "transaction 0xabc still PENDING after 3 status checks"
        );

        let err = TransactionError::UnknownStatus {
            tx_hash: "0xabc".into(),
            status: "LOST".into(),
        };
        assert!(err.to_string().contains("\"LOST\""));
    }

    #[test]
    fn test_decode_error_keeps_status() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = TransactionError::Forwarding(UpstreamError::Decode {
            status: 502,
            source,
        });
        assert!(err.to_string().contains("status 502"));
        assert_eq!(err.kind(), "forwarding");
    }
}
