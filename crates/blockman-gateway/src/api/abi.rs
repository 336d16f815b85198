//! ABI management: upload, inspect, list, remove.

use super::types::*;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::functions::extract_functions;
use crate::domain::registry::{AbiRegistry, RegistryError};
use crate::domain::AbiId;
use crate::middleware::GatewayMetrics;
use alloy_core::json_abi::JsonAbi;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Handlers for the ABI endpoints
pub struct AbiApi {
    registry: Arc<AbiRegistry>,
    metrics: Arc<GatewayMetrics>,
}

impl AbiApi {
    pub fn new(registry: Arc<AbiRegistry>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Parse and store an uploaded ABI
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub fn upload(&self, body: &str) -> ApiResult<UploadAbiResponse> {
        let request: UploadAbiRequest =
            serde_json::from_str(body).map_err(ApiError::invalid_request)?;

        if request.abi.is_null() {
            return Err(ApiError::invalid_request("field `abi` is required"));
        }

        let abi = parse_abi(request.abi).map_err(|e| {
            debug!(error = %e, "Rejected ABI");
            ApiError::bad_request("Invalid ABI format").with_details(e)
        })?;

        let functions = abi.functions().count();
        let abi_id = self.registry.save(abi);
        self.metrics.record_upload();

        info!(abi_id = %abi_id, functions, "ABI uploaded");

        Ok(UploadAbiResponse {
            message: "ABI uploaded successfully",
            abi_id,
        })
    }

    /// Describe every function of a stored ABI. Counts as a use of the entry.
    #[instrument(skip(self, body))]
    pub fn list_functions(&self, body: &str) -> ApiResult<ListFunctionsResponse> {
        let request: ListFunctionsRequest =
            serde_json::from_str(body).map_err(ApiError::invalid_request)?;

        if request.abi_id.is_empty() {
            return Err(ApiError::invalid_request("field `abi_id` is required"));
        }

        let abi = AbiId::parse(&request.abi_id)
            .ok()
            .and_then(|id| self.registry.get(&id))
            .ok_or_else(|| ApiError::abi_not_found(&request.abi_id))?;

        let functions = extract_functions(&abi);
        Ok(ListFunctionsResponse {
            total_functions: functions.len(),
            functions,
        })
    }

    /// Snapshot of every stored ABI. Does not touch entries.
    #[instrument(skip(self))]
    pub fn list_abis(&self) -> ListAbisResponse {
        let abis: Vec<AbiSummary> = self
            .registry
            .list()
            .into_iter()
            .map(|(abi_id, record)| AbiSummary {
                abi_id,
                created_at: record.created_at,
                last_used: record.last_used,
                total_functions: record.abi.functions().count(),
                total_events: record.abi.events().count(),
            })
            .collect();

        ListAbisResponse {
            total: abis.len(),
            abis,
        }
    }

    /// Delete a stored ABI
    #[instrument(skip(self))]
    pub fn remove(&self, raw_id: &str) -> ApiResult<RemoveAbiResponse> {
        let abi_id = AbiId::parse(raw_id).map_err(|_| ApiError::abi_not_found(raw_id))?;

        match self.registry.remove(&abi_id) {
            Ok(()) => {
                self.metrics.record_removal();
                info!(abi_id = %abi_id, "ABI removed");
                Ok(RemoveAbiResponse {
                    message: "ABI removed successfully",
                    abi_id,
                })
            }
            Err(RegistryError::NotFound(_)) => Err(ApiError::abi_not_found(raw_id)),
        }
    }
}

/// Accept the ABI either inline or as a JSON-encoded string
fn parse_abi(value: Value) -> Result<JsonAbi, serde_json::Error> {
    match value {
        Value::String(s) => serde_json::from_str(&s),
        other => serde_json::from_value(other),
    }
}
