//! Transaction wire types shared by the handler, the service and the upstream client.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::transaction::error::TransactionError;

/// Inbound broadcast request, forwarded verbatim to the upstream broadcaster.
///
/// Missing or null fields decode to their zero value so that
/// [`validate`](Self::validate) reports them instead of the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastTransactionRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: u64,
}

/// Decode `null` as the type's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl BroadcastTransactionRequest {
    /// Check that every field is present and non-zero.
    ///
    /// All failing fields are reported in a single [`TransactionError::Validation`].
    pub fn validate(&self) -> Result<(), TransactionError> {
        let mut missing = Vec::new();
        if self.symbol.is_empty() {
            missing.push("symbol");
        }
        if self.price == 0 {
            missing.push("price");
        }
        if self.timestamp == 0 {
            missing.push("timestamp");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TransactionError::Validation(format!(
                "missing or zero field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Upstream answer to a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastTransactionResponse {
    /// Key for every subsequent status check. Empty when upstream omitted it.
    #[serde(deserialize_with = "null_as_default")]
    pub tx_hash: String,
}

/// Transaction status as reported by upstream.
///
/// Values outside the known set are kept verbatim in [`Unknown`](Self::Unknown);
/// `null` decodes as `Unknown("")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TransactionStatus {
    /// Processed and confirmed.
    Confirmed,
    /// Failed to process.
    Failed,
    /// Awaiting processing.
    Pending,
    /// Upstream has no record of the transaction.
    DoesNotExist,
    /// Anything else upstream sent, including the empty string.
    Unknown(String),
}

impl TransactionStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
            Self::DoesNotExist => "DNE",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether polling stops on this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::DoesNotExist)
    }

    /// Whether this is one of the four documented statuses.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for TransactionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "CONFIRMED" => Self::Confirmed,
            "FAILED" => Self::Failed,
            "PENDING" => Self::Pending,
            "DNE" => Self::DoesNotExist,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<Option<String>> for TransactionStatus {
    fn from(raw: Option<String>) -> Self {
        raw.unwrap_or_default().into()
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status check result; also the final body returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringStatusResponse {
    #[serde(default)]
    pub tx_status: TransactionStatus,
}
