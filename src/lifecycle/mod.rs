//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting
//!             → poll loops observe the signal and cancel
//!             → in-flight requests drained until the graceful timeout
//! ```
//!
//! # Design Decisions
//! - Shutdown has timeout: forced exit after deadline
//! - Poll loops cancel cooperatively instead of relying on connection teardown

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
