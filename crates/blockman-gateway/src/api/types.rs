//! Request and response bodies for the HTTP API.

use crate::domain::functions::FunctionDetail;
use crate::domain::AbiId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /upload-abi`
///
/// `abi` is either the ABI array itself or a string holding the ABI JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAbiRequest {
    pub abi: Value,
}

/// `POST /list-functions`
#[derive(Debug, Clone, Deserialize)]
pub struct ListFunctionsRequest {
    pub abi_id: String,
}

/// `POST /call-function`
///
/// Every field may be omitted; missing values fail the corresponding
/// validation step instead of the body parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallFunctionRequest {
    pub abi_id: Option<String>,
    pub contract_address: Option<String>,
    pub function_name: Option<String>,
    pub function_input: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadAbiResponse {
    pub message: &'static str,
    pub abi_id: AbiId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListFunctionsResponse {
    pub functions: Vec<FunctionDetail>,
    pub total_functions: usize,
}

/// One entry of `GET /abis`
#[derive(Debug, Clone, Serialize)]
pub struct AbiSummary {
    pub abi_id: AbiId,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub total_functions: usize,
    pub total_events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAbisResponse {
    pub abis: Vec<AbiSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveAbiResponse {
    pub message: &'static str,
    pub abi_id: AbiId,
}

/// Result of a contract call.
///
/// `raw` is set when the return data could not be decoded and `result` holds
/// the undecoded bytes as hex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallFunctionResponse {
    pub result: Value,
    pub raw: bool,
}
