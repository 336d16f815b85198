//! Outbound ports for the gateway.

use alloy_core::primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Read-only access to an Ethereum node.
///
/// One operation: run `data` against the contract at `to` without creating a
/// transaction, and hand back the raw return bytes.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, NodeError>;
}

/// Errors from the upstream node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// The node answered with a JSON-RPC error (reverts land here)
    #[error("{message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<String>,
    },
    /// No answer within the configured timeout
    #[error("node request timed out")]
    Timeout,
    /// Connection or protocol failure
    #[error("node transport error: {0}")]
    Transport(String),
    /// The node answered with something that is not hex bytes
    #[error("invalid node response: {0}")]
    InvalidResponse(String),
}
