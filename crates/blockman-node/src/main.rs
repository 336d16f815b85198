use std::sync::Arc;

use anyhow::{Context, Result};
use blockman_gateway::{GatewayService, JsonRpcNodeClient};
use blockman_node::{load_config, load_env_file};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration, a .env file fills in variables not already set
    load_env_file();
    let config = load_config().context("failed to load configuration")?;

    info!("===========================================");
    info!("  Blockman Gateway v{}", blockman_gateway::VERSION);
    info!("===========================================");

    // Connect to the Ethereum node
    let node = JsonRpcNodeClient::new(&config.node)
        .with_context(|| format!("invalid node URL {}", config.node.url))?;
    match node.chain_id().await {
        Ok(chain_id) => info!(url = %node.url(), chain_id, "Connected to Ethereum node"),
        Err(e) => warn!(url = %node.url(), error = %e, "Ethereum node not reachable yet"),
    }

    let service = Arc::new(
        GatewayService::new(config, Arc::new(node)).context("failed to create gateway")?,
    );

    let mut server = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.run().await })
    };

    info!("Gateway is running. Press Ctrl+C to stop.");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
        }
        // Server ended on its own, most likely a bind failure
        result = &mut server => return finish(result),
    }

    // Graceful shutdown
    info!("Shutting down");
    service.shutdown();
    finish(server.await)
}

fn finish(
    result: Result<Result<(), blockman_gateway::GatewayError>, tokio::task::JoinError>,
) -> Result<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!(error = %e, "Gateway failed");
            Err(e.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context("gateway task panicked")),
    }
}
