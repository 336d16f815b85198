//! HTTP API handlers.

pub mod abi;
pub mod call;
pub mod types;

pub use abi::AbiApi;
pub use call::CallApi;

use crate::domain::registry::AbiRegistry;
use crate::middleware::GatewayMetrics;
use crate::ports::outbound::NodeClient;
use std::sync::Arc;

/// All API handlers
pub struct ApiHandlers {
    pub abi: AbiApi,
    pub call: CallApi,
}

impl ApiHandlers {
    /// Create the handlers over a shared registry
    pub fn new(
        registry: Arc<AbiRegistry>,
        node: Arc<dyn NodeClient>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            abi: AbiApi::new(Arc::clone(&registry), Arc::clone(&metrics)),
            call: CallApi::new(registry, node, metrics),
        }
    }
}
