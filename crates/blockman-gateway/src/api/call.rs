//! Read-only contract calls against a stored ABI.

use super::types::{CallFunctionRequest, CallFunctionResponse};
use crate::domain::convert::{convert_argument, is_valid_address};
use crate::domain::decode::{decode_call_result, hex_string};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::functions::{is_read_only, resolve_function, FunctionLookupError};
use crate::domain::registry::AbiRegistry;
use crate::domain::AbiId;
use crate::middleware::GatewayMetrics;
use crate::ports::outbound::{NodeClient, NodeError};
use alloy_core::dyn_abi::{DynSolType, JsonAbiExt, Specifier};
use alloy_core::primitives::Address;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Handler for `POST /call-function`
pub struct CallApi {
    registry: Arc<AbiRegistry>,
    node: Arc<dyn NodeClient>,
    metrics: Arc<GatewayMetrics>,
}

impl CallApi {
    pub fn new(
        registry: Arc<AbiRegistry>,
        node: Arc<dyn NodeClient>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            node,
            metrics,
        }
    }

    /// Encode the call, run it through the node and decode the answer.
    ///
    /// Validation runs in a fixed order (ABI, address, function, arity,
    /// arguments, encoding, mutability) and the first failure is returned.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn call_function(&self, body: &str) -> ApiResult<CallFunctionResponse> {
        let request: CallFunctionRequest = serde_json::from_str(body)
            .map_err(|e| ApiError::bad_request("Invalid JSON").with_details(e))?;

        let raw_id = request.abi_id.unwrap_or_default();
        let abi = AbiId::parse(&raw_id)
            .ok()
            .and_then(|id| self.registry.get(&id))
            .ok_or_else(|| ApiError::abi_not_found(&raw_id))?;

        let contract = request.contract_address.unwrap_or_default();
        let to = parse_contract_address(&contract)?;

        let name = request.function_name.unwrap_or_default();
        let inputs = request.function_input.unwrap_or_default();

        let function = resolve_function(&abi, &name, inputs.len()).map_err(|e| match e {
            FunctionLookupError::NotFound(_) => {
                ApiError::bad_request("Function not found in ABI").with_field("function_name", name.clone())
            }
            FunctionLookupError::Ambiguous { candidates, .. } => {
                ApiError::bad_request("Function is overloaded; call it by full signature")
                    .with_field("function_name", name.clone())
                    .with_field("candidates", candidates)
            }
        })?;

        if inputs.len() != function.inputs.len() {
            return Err(ApiError::bad_request(format!(
                "Expected {} arguments, got {}",
                function.inputs.len(),
                inputs.len()
            )));
        }

        let mut args = Vec::with_capacity(inputs.len());
        for (i, (param, input)) in function.inputs.iter().zip(&inputs).enumerate() {
            let converted = Specifier::<DynSolType>::resolve(param)
                .map_err(|e| e.to_string())
                .and_then(|ty| convert_argument(input, &ty).map_err(|e| e.to_string()))
                .map_err(|reason| {
                    ApiError::bad_request(format!("Failed to convert argument {i}: {reason}"))
                })?;
            args.push(converted);
        }

        let data = function
            .abi_encode_input(&args)
            .map_err(|e| ApiError::internal(format!("Failed to encode function call: {e}")))?;

        if !is_read_only(function) {
            return Err(ApiError::bad_request(
                "State-changing functions require transaction signing, which is not yet supported",
            ));
        }

        let signature = function.signature();
        debug!(%signature, to = %to, data_len = data.len(), "Calling contract");

        let raw = match self.node.call(to, &data).await {
            Ok(raw) => raw,
            Err(err) => {
                self.metrics.record_call(false);
                warn!(%signature, error = %err, "Contract call failed");
                return Err(node_error_response(err));
            }
        };
        self.metrics.record_call(true);

        match decode_call_result(&raw, function) {
            Ok(result) => Ok(CallFunctionResponse { result, raw: false }),
            Err(e) => {
                self.metrics.record_raw_fallback();
                info!(%signature, error = %e, "Returning undecoded call result");
                Ok(CallFunctionResponse {
                    result: hex_string(&raw).into(),
                    raw: true,
                })
            }
        }
    }
}

fn parse_contract_address(s: &str) -> ApiResult<Address> {
    let invalid = || ApiError::bad_request("Valid contract address is required");
    if !is_valid_address(s) {
        return Err(invalid());
    }
    s.parse().map_err(|_| invalid())
}

/// Surface the node's own message, with its code and data when present
fn node_error_response(err: NodeError) -> ApiError {
    match err {
        NodeError::Rpc {
            code,
            message,
            data,
        } => {
            let error = ApiError::internal(message).with_field("code", code);
            match data {
                Some(data) => error.with_field("data", data),
                None => error,
            }
        }
        other => ApiError::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::dyn_abi::DynSolValue;
    use alloy_core::primitives::U256;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use parking_lot::Mutex;
    use serde_json::json;

    const ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"name","stateMutability":"view","inputs":[],
         "outputs":[{"name":"","type":"string"}]}
    ]"#;

    const CONTRACT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const OWNER: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    /// Node that records the calldata and answers with a fixed reply
    struct MockNode {
        reply: Result<Vec<u8>, NodeError>,
        calls: Mutex<Vec<(Address, Vec<u8>)>>,
    }

    impl MockNode {
        fn new(reply: Result<Vec<u8>, NodeError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NodeClient for MockNode {
        async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, NodeError> {
            self.calls.lock().push((to, data.to_vec()));
            self.reply.clone()
        }
    }

    fn setup(node: Arc<MockNode>) -> (CallApi, AbiId, Arc<GatewayMetrics>) {
        let registry = Arc::new(AbiRegistry::new());
        let abi_id = registry.save(serde_json::from_str(ABI).unwrap());
        let metrics = Arc::new(GatewayMetrics::new());
        let api = CallApi::new(registry, node, Arc::clone(&metrics));
        (api, abi_id, metrics)
    }

    fn body(abi_id: &AbiId, function: &str, input: serde_json::Value) -> String {
        json!({
            "abi_id": abi_id.to_string(),
            "contract_address": CONTRACT,
            "function_name": function,
            "function_input": input,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_view_call_decodes_result() {
        let reply = DynSolValue::Uint(U256::from(1234u64), 256).abi_encode();
        let node = MockNode::new(Ok(reply));
        let (api, abi_id, metrics) = setup(Arc::clone(&node));

        let response = api
            .call_function(&body(&abi_id, "balanceOf", json!([OWNER])))
            .await
            .unwrap();
        assert_eq!(response, CallFunctionResponse { result: json!("1234"), raw: false });

        let calls = node.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, CONTRACT.parse::<Address>().unwrap());
        assert_eq!(&calls[0].1[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(calls[0].1.len(), 36);
        assert_eq!(
            metrics.calls_success.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_undecodable_result_falls_back_to_hex() {
        let node = MockNode::new(Ok(vec![0xde, 0xad]));
        let (api, abi_id, metrics) = setup(node);

        let response = api
            .call_function(&body(&abi_id, "name", json!([])))
            .await
            .unwrap();
        assert_eq!(response, CallFunctionResponse { result: json!("0xdead"), raw: true });
        assert_eq!(
            metrics.calls_raw_fallback.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_null() {
        let (api, abi_id, _) = setup(MockNode::new(Ok(Vec::new())));
        let response = api
            .call_function(&body(&abi_id, "name", json!([])))
            .await
            .unwrap();
        assert_eq!(response.result, serde_json::Value::Null);
        assert!(!response.raw);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (api, _, _) = setup(MockNode::new(Ok(Vec::new())));
        let err = api.call_function("{not json").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid JSON");
    }

    #[tokio::test]
    async fn test_unknown_abi_checked_before_address() {
        let (api, _, _) = setup(MockNode::new(Ok(Vec::new())));
        let request = json!({"abi_id": AbiId::new().to_string(), "contract_address": "bad"});
        let err = api.call_function(&request.to_string()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "ABI not found");
    }

    #[tokio::test]
    async fn test_invalid_contract_address() {
        let (api, abi_id, _) = setup(MockNode::new(Ok(Vec::new())));
        for address in ["", "0x123", "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00"] {
            let request = json!({
                "abi_id": abi_id.to_string(),
                "contract_address": address,
                "function_name": "name",
            });
            let err = api.call_function(&request.to_string()).await.unwrap_err();
            assert_eq!(err.message, "Valid contract address is required");
        }
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let (api, abi_id, _) = setup(MockNode::new(Ok(Vec::new())));
        let err = api
            .call_function(&body(&abi_id, "mint", json!([])))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Function not found in ABI");
    }

    #[tokio::test]
    async fn test_argument_count_mismatch() {
        let (api, abi_id, _) = setup(MockNode::new(Ok(Vec::new())));
        let err = api
            .call_function(&body(&abi_id, "balanceOf", json!([])))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Expected 1 arguments, got 0");
    }

    #[tokio::test]
    async fn test_argument_conversion_failure() {
        let (api, abi_id, _) = setup(MockNode::new(Ok(Vec::new())));
        let err = api
            .call_function(&body(&abi_id, "balanceOf", json!(["0xnothex"])))
            .await
            .unwrap_err();
        assert_eq!(
            err.message,
            "Failed to convert argument 0: invalid Ethereum address: 0xnothex"
        );
    }

    #[tokio::test]
    async fn test_state_changing_function_rejected_without_node_call() {
        let node = MockNode::new(Ok(Vec::new()));
        let (api, abi_id, _) = setup(Arc::clone(&node));
        let err = api
            .call_function(&body(&abi_id, "transfer", json!([OWNER, "10"])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("State-changing functions"));
        assert!(node.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_node_error_passed_through() {
        let node = MockNode::new(Err(NodeError::Rpc {
            code: 3,
            message: "execution reverted".into(),
            data: Some("0x08c379a0".into()),
        }));
        let (api, abi_id, metrics) = setup(node);

        let err = api
            .call_function(&body(&abi_id, "balanceOf", json!([OWNER])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "execution reverted");
        assert_eq!(err.field("code"), Some(&json!(3)));
        assert_eq!(err.field("data"), Some(&json!("0x08c379a0")));
        assert_eq!(
            metrics.calls_failed.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_timeout_maps_to_internal_error() {
        let (api, abi_id, _) = setup(MockNode::new(Err(NodeError::Timeout)));
        let err = api
            .call_function(&body(&abi_id, "balanceOf", json!([OWNER])))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "node request timed out");
    }
}
