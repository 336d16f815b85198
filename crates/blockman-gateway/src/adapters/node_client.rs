//! Ethereum JSON-RPC node client.
//!
//! Implements [`NodeClient`] with `eth_call` over HTTP.

use crate::domain::config::NodeConfig;
use crate::ports::outbound::{NodeClient, NodeError};
use alloy_core::primitives::Address;
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Serialize;
use tracing::{debug, instrument};

/// Call object for `eth_call`
#[derive(Debug, Clone, Serialize)]
struct CallRequest {
    to: String,
    data: String,
}

/// JSON-RPC client for a single upstream node
pub struct JsonRpcNodeClient {
    client: HttpClient,
    url: String,
    block_tag: String,
}

impl JsonRpcNodeClient {
    /// Build a client for the configured node.
    ///
    /// No request is made here; use [`JsonRpcNodeClient::chain_id`] to check
    /// connectivity.
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let client = HttpClientBuilder::default()
            .request_timeout(config.request_timeout)
            .build(&config.url)
            .map_err(|e| NodeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            block_tag: config.block_tag.clone(),
        })
    }

    /// Endpoint this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `eth_chainId`
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn chain_id(&self) -> Result<u64, NodeError> {
        let result: String = self
            .client
            .request("eth_chainId", rpc_params![])
            .await
            .map_err(map_client_error)?;

        u64::from_str_radix(result.trim_start_matches("0x"), 16)
            .map_err(|_| NodeError::InvalidResponse(format!("invalid chain id: {result}")))
    }
}

#[async_trait]
impl NodeClient for JsonRpcNodeClient {
    #[instrument(skip(self, data), fields(to = %to, data_len = data.len()))]
    async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, NodeError> {
        let request = CallRequest {
            to: to.to_checksum(None),
            data: format!("0x{}", hex::encode(data)),
        };

        let result: String = self
            .client
            .request("eth_call", rpc_params![request, self.block_tag.as_str()])
            .await
            .map_err(map_client_error)?;

        debug!(result_len = result.len(), "eth_call returned");
        decode_hex_result(&result)
    }
}

/// Decode a 0x-prefixed hex string returned by the node
pub(crate) fn decode_hex_result(result: &str) -> Result<Vec<u8>, NodeError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits).map_err(|e| NodeError::InvalidResponse(format!("{result}: {e}")))
}

fn map_client_error(err: ClientError) -> NodeError {
    match err {
        ClientError::Call(obj) => NodeError::Rpc {
            code: obj.code(),
            message: obj.message().to_string(),
            data: obj.data().map(|raw| raw.get().trim_matches('"').to_string()),
        },
        ClientError::RequestTimeout => NodeError::Timeout,
        other => NodeError::Transport(other.to_string()),
    }
}
