//! Blockman gateway - ABI registry and read-only contract calls over HTTP.
//!
//! Clients upload a contract ABI, list the functions it declares, and invoke
//! `view`/`pure` functions against an Ethereum node through `eth_call`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        BLOCKMAN GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   POST /upload-abi   POST /list-functions   POST /call-function  │
//! │   GET /abis          DELETE /abis/:id       GET /health /metrics │
//! │                              │                                   │
//! │  ┌───────────────────────────┴──────────────────────────────┐    │
//! │  │   Middleware: Request span → Body limit → CORS → Timeout │    │
//! │  └───────────────────────────┬──────────────────────────────┘    │
//! │                              │                                   │
//! │        ┌─────────────┐  ┌────┴────────┐  ┌─────────────────┐     │
//! │        │   AbiApi    │  │   CallApi   │  │  cleanup_task   │     │
//! │        └──────┬──────┘  └──┬───────┬──┘  └────────┬────────┘     │
//! │               │            │       │              │              │
//! │        ┌──────┴────────────┴──┐  ┌─┴──────────┐   │              │
//! │        │      AbiRegistry     │◄─┼────────────┼───┘              │
//! │        └──────────────────────┘  │ NodeClient │                  │
//! │                                  └─────┬──────┘                  │
//! └────────────────────────────────────────┼─────────────────────────┘
//!                                          │ eth_call
//!                                          ▼
//!                                   Ethereum node
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use blockman_gateway::{GatewayConfig, GatewayService, JsonRpcNodeClient};
//!
//! let config = GatewayConfig::default();
//! let node = Arc::new(JsonRpcNodeClient::new(&config.node)?);
//! let service = GatewayService::new(config, node)?;
//! service.run().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod api;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use adapters::JsonRpcNodeClient;
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::registry::{AbiRecord, AbiRegistry, RegistryError};
pub use domain::{AbiId, InvalidAbiId};
pub use middleware::GatewayMetrics;
pub use ports::outbound::{NodeClient, NodeError, SystemTimeSource, TimeSource};
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
