//! Middleware stack for the gateway.
//!
//! Layer order: Request → Request span → Body limit → CORS → Timeout → Handler

pub mod cors;
pub mod metrics;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestOutcome};
pub use self::tracing::RequestSpanLayer;
