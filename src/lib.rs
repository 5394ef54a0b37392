//! Transaction broadcast proxy library.
//!
//! Accepts a broadcast request over HTTP, forwards it to an upstream
//! broadcaster, then polls the upstream until the transaction reaches a
//! terminal status.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod transaction;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
