//! # Blockman Node
//!
//! Process wiring for the Blockman gateway: environment configuration,
//! logging, the upstream node client and signal handling.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load `.env` if present, then configuration from the environment
//! 3. Build the JSON-RPC client and query the node's chain id
//! 4. Serve the HTTP API and the cleanup task
//! 5. Stop both on Ctrl+C

pub mod config;

pub use config::{
    load_config, load_config_from, load_env_file, load_env_file_from, ConfigLoadError,
};
