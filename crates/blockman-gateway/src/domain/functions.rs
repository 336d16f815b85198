//! ABI inspection: function listing and name resolution.

use alloy_core::json_abi::{Function, JsonAbi, Param, StateMutability};
use serde::Serialize;

/// A contract function as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDetail {
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub signature: String,
    /// 4-byte selector as 0x-prefixed hex
    pub selector: String,
    pub inputs: Vec<ArgumentDetail>,
    pub outputs: Vec<ArgumentDetail>,
    pub state_mutability: &'static str,
    /// `view` or `pure`
    pub constant: bool,
    pub payable: bool,
    pub stateful: bool,
}

/// A single function argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Why a function name could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FunctionLookupError {
    #[error("function not found: {0}")]
    NotFound(String),
    #[error("function {name} is overloaded; use one of: {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

/// List every function declared in the ABI, ordered by name.
pub fn extract_functions(abi: &JsonAbi) -> Vec<FunctionDetail> {
    abi.functions().map(describe_function).collect()
}

/// Describe a single function
pub fn describe_function(function: &Function) -> FunctionDetail {
    let constant = is_read_only(function);
    FunctionDetail {
        name: function.name.clone(),
        signature: function.signature(),
        selector: format!("0x{}", hex::encode(function.selector())),
        inputs: describe_params(&function.inputs),
        outputs: describe_params(&function.outputs),
        state_mutability: mutability_str(function.state_mutability),
        constant,
        payable: function.state_mutability == StateMutability::Payable,
        stateful: !constant,
    }
}

fn describe_params(params: &[Param]) -> Vec<ArgumentDetail> {
    params
        .iter()
        .map(|param| ArgumentDetail {
            name: param.name.clone(),
            ty: param.selector_type().into_owned(),
        })
        .collect()
}

/// Whether a function can be served by eth_call
pub fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::View | StateMutability::Pure
    )
}

fn mutability_str(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}

/// Find the function a caller means.
///
/// `name` is either a bare name or a full signature such as
/// `balanceOf(address)`. For an overloaded bare name the overload taking
/// `arg_count` arguments is chosen; when none matches, the first overload is
/// returned and the caller's argument-count check reports the mismatch.
pub fn resolve_function<'a>(
    abi: &'a JsonAbi,
    name: &str,
    arg_count: usize,
) -> Result<&'a Function, FunctionLookupError> {
    let name = name.trim();

    if name.contains('(') {
        let wanted: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        return abi
            .functions()
            .find(|f| f.signature() == wanted)
            .ok_or_else(|| FunctionLookupError::NotFound(name.to_string()));
    }

    let overloads = abi
        .function(name)
        .filter(|overloads| !overloads.is_empty())
        .ok_or_else(|| FunctionLookupError::NotFound(name.to_string()))?;

    if overloads.len() == 1 {
        return Ok(&overloads[0]);
    }

    let mut matching = overloads.iter().filter(|f| f.inputs.len() == arg_count);
    match (matching.next(), matching.next()) {
        (Some(function), None) => Ok(function),
        (Some(_), Some(_)) => Err(FunctionLookupError::Ambiguous {
            name: name.to_string(),
            candidates: overloads
                .iter()
                .filter(|f| f.inputs.len() == arg_count)
                .map(Function::signature)
                .collect(),
        }),
        (None, _) => Ok(&overloads[0]),
    }
}
