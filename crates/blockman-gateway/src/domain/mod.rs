//! Domain types for the gateway.
//!
//! Registry, ABI inspection, argument conversion and result decoding live
//! here. None of it touches the network.

pub mod abi_id;
pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod functions;
pub mod registry;

// Re-exports for convenience
pub use abi_id::{AbiId, InvalidAbiId};
pub use config::{CleanupConfig, GatewayConfig, NodeConfig};
pub use convert::{convert_argument, is_valid_address, ConversionError};
pub use decode::{decode_call_result, DecodeError};
pub use error::{ApiError, ApiResult, GatewayError};
pub use functions::{
    extract_functions, resolve_function, ArgumentDetail, FunctionDetail, FunctionLookupError,
};
pub use registry::{cleanup_task, AbiRecord, AbiRegistry, RegistryError};
