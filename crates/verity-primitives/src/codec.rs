//! Call-data encoding used to recompute what an intent expects the wallet to send.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{PrimitivesError, Result};

/// Typed argument of a contract function or constructor call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FunctionArgument {
    Address(Address),
    Uint256(U256),
    Bool(bool),
    String(String),
    Bytes(Bytes),
    Bytes32(B256),
    AddressArray(Vec<Address>),
    Uint256Array(Vec<U256>),
}

impl FunctionArgument {
    /// Canonical solidity type name, as used in function signatures.
    pub fn sol_type(&self) -> &'static str {
        match self {
            FunctionArgument::Address(_) => "address",
            FunctionArgument::Uint256(_) => "uint256",
            FunctionArgument::Bool(_) => "bool",
            FunctionArgument::String(_) => "string",
            FunctionArgument::Bytes(_) => "bytes",
            FunctionArgument::Bytes32(_) => "bytes32",
            FunctionArgument::AddressArray(_) => "address[]",
            FunctionArgument::Uint256Array(_) => "uint256[]",
        }
    }

    pub fn to_sol_value(&self) -> DynSolValue {
        match self {
            FunctionArgument::Address(address) => DynSolValue::Address(*address),
            FunctionArgument::Uint256(value) => DynSolValue::Uint(*value, 256),
            FunctionArgument::Bool(value) => DynSolValue::Bool(*value),
            FunctionArgument::String(value) => DynSolValue::String(value.clone()),
            FunctionArgument::Bytes(value) => DynSolValue::Bytes(value.to_vec()),
            FunctionArgument::Bytes32(value) => DynSolValue::FixedBytes(*value, 32),
            FunctionArgument::AddressArray(values) => {
                DynSolValue::Array(values.iter().copied().map(DynSolValue::Address).collect())
            }
            FunctionArgument::Uint256Array(values) => DynSolValue::Array(
                values
                    .iter()
                    .map(|value| DynSolValue::Uint(*value, 256))
                    .collect(),
            ),
        }
    }
}

/// Encodes function calls and constructor arguments into call-data.
///
/// Implementations must be deterministic: identical arguments always produce identical
/// bytes, otherwise comparing observed call-data against a recomputed expectation is meaningless.
pub trait FunctionEncoder: Send + Sync + Debug {
    fn encode(&self, function_name: &str, arguments: &[FunctionArgument]) -> Result<Bytes>;
    fn encode_constructor(&self, arguments: &[FunctionArgument]) -> Result<Bytes>;
}

/// Standard solidity ABI encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbiFunctionEncoder;

impl AbiFunctionEncoder {
    pub fn new() -> Self {
        Self
    }

    /// `name(type1,type2,...)`
    pub fn function_signature(function_name: &str, arguments: &[FunctionArgument]) -> String {
        let types = arguments
            .iter()
            .map(FunctionArgument::sol_type)
            .collect::<Vec<_>>()
            .join(",");
        format!("{function_name}({types})")
    }

    fn encode_params(arguments: &[FunctionArgument]) -> Vec<u8> {
        DynSolValue::Tuple(arguments.iter().map(FunctionArgument::to_sol_value).collect())
            .abi_encode_params()
    }
}

impl FunctionEncoder for AbiFunctionEncoder {
    fn encode(&self, function_name: &str, arguments: &[FunctionArgument]) -> Result<Bytes> {
        validate_function_name(function_name)?;

        let signature = Self::function_signature(function_name, arguments);
        let selector = &keccak256(signature.as_bytes())[..4];
        let params = Self::encode_params(arguments);

        let mut data = Vec::with_capacity(4 + params.len());
        data.extend_from_slice(selector);
        data.extend_from_slice(&params);
        Ok(Bytes::from(data))
    }

    fn encode_constructor(&self, arguments: &[FunctionArgument]) -> Result<Bytes> {
        Ok(Bytes::from(Self::encode_params(arguments)))
    }
}

/// Solidity identifier check applied before a selector is derived from `function_name`.
pub fn validate_function_name(function_name: &str) -> Result<()> {
    let mut chars = function_name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(PrimitivesError::EncodingError(format!(
            "invalid function name: {function_name:?}"
        )))
    }
}
