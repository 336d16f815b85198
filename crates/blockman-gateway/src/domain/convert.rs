//! Conversion of loosely-typed JSON call arguments into ABI values.
//!
//! Clients send whatever JSON is convenient: numbers or decimal strings for
//! integers, `"true"`/`1` for booleans, hex strings for bytes. Each parameter
//! type accepts a fixed set of JSON shapes; everything else is rejected with a
//! message naming the argument kind and the expected Solidity type.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_core::primitives::{Address, B256, I256, U256};
use serde_json::{Number, Value};

/// Why an argument could not be converted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid Ethereum address: {0}")]
    InvalidAddress(String),
    #[error("failed to parse uint: {0}")]
    InvalidUint(String),
    #[error("failed to parse int: {0}")]
    InvalidInt(String),
    #[error("value {value} out of range for {ty}")]
    OutOfRange { value: String, ty: String },
    #[error("invalid boolean value: {0}")]
    InvalidBool(String),
    #[error("invalid hex bytes: {0}")]
    InvalidHex(String),
    #[error("expected {expected} bytes, got {actual}")]
    BytesLength { expected: usize, actual: usize },
    #[error("expected {expected} elements for {ty}, got {actual}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ConversionError>,
    },
    #[error("unsupported type conversion from {from} to {to}")]
    Unsupported { from: &'static str, to: String },
}

/// Whether `s` is a 0x-prefixed, 20-byte hex address.
///
/// Checksum casing is not verified.
pub fn is_valid_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => s.len() == 42 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Convert one JSON argument to a value of the given ABI type
pub fn convert_argument(input: &Value, ty: &DynSolType) -> Result<DynSolValue, ConversionError> {
    match (ty, input) {
        (DynSolType::Address, Value::String(s)) => parse_address(s).map(DynSolValue::Address),

        (DynSolType::Uint(bits), Value::String(s)) => {
            let value = parse_uint_str(s)?;
            check_uint_range(value, *bits, ty)
        }
        (DynSolType::Uint(bits), Value::Number(n)) => {
            let value = uint_from_number(n, ty)?;
            check_uint_range(value, *bits, ty)
        }

        (DynSolType::Int(bits), Value::String(s)) => {
            let value = parse_int_str(s)?;
            check_int_range(value, *bits, ty)
        }
        (DynSolType::Int(bits), Value::Number(n)) => {
            let value = int_from_number(n, ty)?;
            check_int_range(value, *bits, ty)
        }

        (DynSolType::Bool, Value::String(s)) => match s.to_lowercase().as_str() {
            "true" | "1" => Ok(DynSolValue::Bool(true)),
            "false" | "0" => Ok(DynSolValue::Bool(false)),
            _ => Err(ConversionError::InvalidBool(s.clone())),
        },
        (DynSolType::Bool, Value::Number(n)) => {
            Ok(DynSolValue::Bool(n.as_f64().is_some_and(|f| f != 0.0)))
        }
        (DynSolType::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),

        (DynSolType::String, Value::String(s)) => Ok(DynSolValue::String(s.clone())),

        (DynSolType::Bytes, Value::String(s)) => decode_hex(s).map(DynSolValue::Bytes),
        (DynSolType::FixedBytes(size), Value::String(s)) => {
            let bytes = decode_hex(s)?;
            if bytes.len() != *size {
                return Err(ConversionError::BytesLength {
                    expected: *size,
                    actual: bytes.len(),
                });
            }
            let mut word = B256::ZERO;
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(word, *size))
        }

        (DynSolType::Array(inner), Value::Array(items)) => {
            convert_elements(items, |_| inner.as_ref()).map(DynSolValue::Array)
        }
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(ConversionError::LengthMismatch {
                    ty: type_name(ty),
                    expected: *len,
                    actual: items.len(),
                });
            }
            convert_elements(items, |_| inner.as_ref()).map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(ConversionError::LengthMismatch {
                    ty: type_name(ty),
                    expected: types.len(),
                    actual: items.len(),
                });
            }
            convert_elements(items, |i| &types[i]).map(DynSolValue::Tuple)
        }

        _ => Err(ConversionError::Unsupported {
            from: json_kind(input),
            to: type_name(ty),
        }),
    }
}

fn convert_elements<'t, F>(items: &[Value], ty_at: F) -> Result<Vec<DynSolValue>, ConversionError>
where
    F: Fn(usize) -> &'t DynSolType,
{
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            convert_argument(item, ty_at(index)).map_err(|e| ConversionError::Element {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

fn parse_address(s: &str) -> Result<Address, ConversionError> {
    if !is_valid_address(s) {
        return Err(ConversionError::InvalidAddress(s.to_string()));
    }
    s.parse::<Address>()
        .map_err(|_| ConversionError::InvalidAddress(s.to_string()))
}

fn parse_uint_str(s: &str) -> Result<U256, ConversionError> {
    let invalid = || ConversionError::InvalidUint(s.to_string());
    let trimmed = s.trim();
    match trimmed.strip_prefix("0x") {
        Some(digits) if is_digits(digits, 16) => {
            U256::from_str_radix(digits, 16).map_err(|_| invalid())
        }
        None if is_digits(trimmed, 10) => U256::from_str_radix(trimmed, 10).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_int_str(s: &str) -> Result<I256, ConversionError> {
    let trimmed = s.trim();
    let magnitude = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if !is_digits(magnitude, 10) {
        return Err(ConversionError::InvalidInt(s.to_string()));
    }
    I256::from_dec_str(trimmed).map_err(|_| ConversionError::InvalidInt(s.to_string()))
}

/// Non-empty and made only of digits in `radix`; no signs or separators
fn is_digits(s: &str, radix: u32) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_digit(radix))
}

/// Decimal digits of a JSON number with no fractional part.
///
/// Floats like `1e3` or `1000.0` count as integers.
fn integral_digits(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => Some("0".to_string()),
        Some(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{f:.0}")),
        _ => None,
    }
}

fn uint_from_number(n: &Number, ty: &DynSolType) -> Result<U256, ConversionError> {
    let digits = integral_digits(n).ok_or_else(|| ConversionError::InvalidUint(n.to_string()))?;
    if digits.starts_with('-') {
        return Err(ConversionError::OutOfRange {
            value: n.to_string(),
            ty: type_name(ty),
        });
    }
    U256::from_str_radix(&digits, 10).map_err(|_| ConversionError::OutOfRange {
        value: n.to_string(),
        ty: type_name(ty),
    })
}

fn int_from_number(n: &Number, ty: &DynSolType) -> Result<I256, ConversionError> {
    let digits = integral_digits(n).ok_or_else(|| ConversionError::InvalidInt(n.to_string()))?;
    I256::from_dec_str(&digits).map_err(|_| ConversionError::OutOfRange {
        value: n.to_string(),
        ty: type_name(ty),
    })
}

fn check_uint_range(value: U256, bits: usize, ty: &DynSolType) -> Result<DynSolValue, ConversionError> {
    if value.bit_len() > bits {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            ty: type_name(ty),
        });
    }
    Ok(DynSolValue::Uint(value, bits))
}

fn check_int_range(value: I256, bits: usize, ty: &DynSolType) -> Result<DynSolValue, ConversionError> {
    if bits < 256 {
        // |min| == 2^(bits-1), max == 2^(bits-1) - 1
        let bound = U256::from(1u8) << (bits - 1);
        let (_, abs) = value.into_sign_and_abs();
        let fits = if value.is_negative() { abs <= bound } else { abs < bound };
        if !fits {
            return Err(ConversionError::OutOfRange {
                value: value.to_string(),
                ty: type_name(ty),
            });
        }
    }
    Ok(DynSolValue::Int(value, bits))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, ConversionError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| ConversionError::InvalidHex(format!("{s}: {e}")))
}

fn type_name(ty: &DynSolType) -> String {
    ty.sol_type_name().into_owned()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
