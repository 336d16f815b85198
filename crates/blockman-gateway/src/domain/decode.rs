//! Decoding of raw `eth_call` return data into JSON.

use alloy_core::dyn_abi::{DynSolValue, FunctionExt};
use alloy_core::json_abi::Function;
use serde_json::{Map, Value};

/// Return data did not match the function's declared outputs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to unpack result: {0}")]
pub struct DecodeError(pub String);

/// Decode the bytes returned by a call to `function`.
///
/// - no bytes at all: `null`
/// - function declares no outputs: the bytes as 0x-hex
/// - a single output: that value
/// - several outputs: an object keyed by output name (`output{i}` when unnamed)
pub fn decode_call_result(raw: &[u8], function: &Function) -> Result<Value, DecodeError> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    if function.outputs.is_empty() {
        return Ok(Value::String(hex_string(raw)));
    }

    let values = function
        .abi_decode_output(raw, false)
        .map_err(|e| DecodeError(e.to_string()))?;

    if values.len() == 1 {
        return Ok(value_to_json(&values[0]));
    }

    let mut named = Map::with_capacity(values.len());
    for (i, (output, value)) in function.outputs.iter().zip(values.iter()).enumerate() {
        let key = if output.name.is_empty() {
            format!("output{i}")
        } else {
            output.name.clone()
        };
        named.insert(key, value_to_json(value));
    }

    Ok(Value::Object(named))
}

/// Render an ABI value as JSON.
///
/// Integers become decimal strings so 256-bit values survive JavaScript
/// clients; addresses use EIP-55 checksum casing.
pub fn value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex_string(&word[..*size])),
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Function(function) => Value::String(hex_string(function.as_slice())),
        DynSolValue::Bytes(bytes) => Value::String(hex_string(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

/// 0x-prefixed lowercase hex
pub fn hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
