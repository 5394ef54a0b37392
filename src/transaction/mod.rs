//! Transaction forwarding and status monitoring.
//!
//! # Data Flow
//! ```text
//! BroadcastTransactionRequest
//!     → service.rs forward (POST {upstream}/broadcast)
//!     → BroadcastTransactionResponse { tx_hash }
//!     → service.rs poll_until_terminal (GET {upstream}/check/{tx_hash}, fixed interval)
//!     → MonitoringStatusResponse { tx_status } once CONFIRMED / FAILED / DNE
//! ```

pub mod error;
pub mod service;
pub mod types;
pub mod upstream;

pub use error::{TransactionError, UpstreamError};
pub use service::TransactionService;
pub use types::{
    BroadcastTransactionRequest, BroadcastTransactionResponse, MonitoringStatusResponse,
    TransactionStatus,
};
pub use upstream::{UpstreamApi, UpstreamClient};
