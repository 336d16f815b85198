//! Adapters: concrete implementations of the outbound ports and conversions
//! from infrastructure types.

pub mod error_conversions;
pub mod node_client;

pub use node_client::JsonRpcNodeClient;
