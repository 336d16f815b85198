//! Gateway service - router construction, background sweeper and serving.

use crate::api::types::{
    CallFunctionResponse, ListAbisResponse, ListFunctionsResponse, RemoveAbiResponse,
    UploadAbiResponse,
};
use crate::api::ApiHandlers;
use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiResult, GatewayError};
use crate::domain::registry::{cleanup_task, AbiRegistry};
use crate::middleware::{create_cors_layer, GatewayMetrics, RequestSpanLayer};
use crate::ports::outbound::{NodeClient, TimeSource};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

/// Blockman gateway service
pub struct GatewayService {
    config: GatewayConfig,
    handlers: Arc<ApiHandlers>,
    registry: Arc<AbiRegistry>,
    metrics: Arc<GatewayMetrics>,
    shutdown_tx: watch::Sender<bool>,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: GatewayConfig, node: Arc<dyn NodeClient>) -> Result<Self, GatewayError> {
        Self::build(config, node, Arc::new(AbiRegistry::new()))
    }

    /// Create a gateway whose registry runs on the given clock
    pub fn with_time_source(
        config: GatewayConfig,
        node: Arc<dyn NodeClient>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, GatewayError> {
        Self::build(config, node, Arc::new(AbiRegistry::with_time_source(clock)))
    }

    fn build(
        config: GatewayConfig,
        node: Arc<dyn NodeClient>,
        registry: Arc<AbiRegistry>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let metrics = Arc::new(GatewayMetrics::new());
        let handlers = Arc::new(ApiHandlers::new(
            Arc::clone(&registry),
            node,
            Arc::clone(&metrics),
        ));
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            handlers,
            registry,
            metrics,
            shutdown_tx,
        })
    }

    /// Bind the configured address and serve until [`GatewayService::shutdown`]
    pub async fn run(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GatewayError> {
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        let sweeper = self.start_cleanup_task();

        info!(addr = %addr, "Starting HTTP server");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                // A dropped sender also ends the wait
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("Received shutdown signal");
            })
            .await;

        // Make sure the sweeper stops even when the server failed on its own
        self.shutdown_tx.send_replace(true);
        if let Some(handle) = sweeper {
            let _ = handle.await;
        }

        match result {
            Ok(()) => {
                info!("Gateway stopped");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "HTTP server error");
                Err(GatewayError::Serve(e.to_string()))
            }
        }
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Get the ABI registry
    pub fn registry(&self) -> Arc<AbiRegistry> {
        Arc::clone(&self.registry)
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Build the HTTP router with the full middleware stack
    pub fn router(&self) -> Router {
        let state = AppState {
            handlers: Arc::clone(&self.handlers),
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
        };

        let middleware = ServiceBuilder::new()
            .layer(RequestSpanLayer::new(Arc::clone(&self.metrics)))
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_size))
            .layer(create_cors_layer(&self.config.cors))
            .layer(TimeoutLayer::new(self.config.limits.request_timeout));

        Router::new()
            .route("/upload-abi", post(upload_abi))
            .route("/list-functions", post(list_functions))
            .route("/call-function", post(call_function))
            .route("/abis", get(list_abis))
            .route("/abis/:id", delete(remove_abi))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics))
            .layer(middleware)
            .with_state(state)
    }

    fn start_cleanup_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.cleanup.enabled {
            info!("ABI cleanup disabled");
            return None;
        }

        let registry = Arc::clone(&self.registry);
        let metrics = Arc::clone(&self.metrics);
        let cleanup = self.config.cleanup.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        Some(tokio::spawn(async move {
            cleanup_task(registry, cleanup, shutdown_rx, move |removed| {
                metrics.record_evictions(removed)
            })
            .await;
        }))
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    handlers: Arc<ApiHandlers>,
    registry: Arc<AbiRegistry>,
    metrics: Arc<GatewayMetrics>,
}

async fn upload_abi(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<UploadAbiResponse>> {
    state.handlers.abi.upload(&body).map(Json)
}

async fn list_functions(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<ListFunctionsResponse>> {
    state.handlers.abi.list_functions(&body).map(Json)
}

async fn call_function(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<CallFunctionResponse>> {
    state.handlers.call.call_function(&body).await.map(Json)
}

async fn list_abis(State(state): State<AppState>) -> Json<ListAbisResponse> {
    Json(state.handlers.abi.list_abis())
}

async fn remove_abi(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemoveAbiResponse>> {
    state.handlers.abi.remove(&id).map(Json)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "abis": state.registry.len(),
    }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}
