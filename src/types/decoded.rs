//! Decoded call trees and the atomic transaction records produced by flattening

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Operation;
use crate::error::{Error, Result};

/// Method name of the Safe's own execution entry point
pub const EXEC_TRANSACTION: &str = "execTransaction";

/// Method name of the MultiSend batching call
pub const MULTI_SEND: &str = "multiSend";

/// Method and positional parameters of a decoded call, as produced by a decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDecoded {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// A single decoded parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_decoded: Option<ValueDecoded>,
}

/// Nested decoding attached to a parameter
///
/// Shapes that match neither a batch nor a call land in `Other`, so loading
/// decoder output never fails on an unexpected nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueDecoded {
    /// Inner transactions of a `multiSend`
    Batch(Vec<BatchEntry>),
    /// Decoded inner calldata (e.g. the `data` argument of `execTransaction`)
    Call(Box<DataDecoded>),
    Other(Value),
}

/// One inner transaction of a `multiSend` batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    #[serde(default)]
    pub operation: Operation,
    pub to: Address,
    #[serde(default, deserialize_with = "deserialize_u256")]
    pub value: U256,
    #[serde(default)]
    pub data: Option<Bytes>,
    #[serde(default)]
    pub data_decoded: Option<DataDecoded>,
}

/// An atomic action: one call (or delegatecall) with its own decoding
///
/// After flattening, `data_decoded` only describes this action's call; wrapper
/// calls never survive as leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    #[serde(default)]
    pub operation: Operation,
    pub to: Address,
    #[serde(default, deserialize_with = "deserialize_u256")]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub data_decoded: Option<DataDecoded>,
}

impl DecodedTransaction {
    /// Creates a plain call without decoding
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self {
            operation: Operation::Call,
            to,
            value,
            data: data.into(),
            data_decoded: None,
        }
    }

    /// Sets the operation type
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Attaches decoder output
    pub fn with_data_decoded(mut self, data_decoded: Option<DataDecoded>) -> Self {
        self.data_decoded = data_decoded;
        self
    }

    /// True when there is no calldata (`0x`)
    pub fn is_empty_data(&self) -> bool {
        self.data.is_empty()
    }

    /// Structural classification of this transaction's decoded call
    pub fn kind(&self) -> Result<DecodedCallKind<'_>> {
        match &self.data_decoded {
            Some(decoded) => decoded.kind(),
            None => Ok(DecodedCallKind::Opaque),
        }
    }
}

impl From<BatchEntry> for DecodedTransaction {
    fn from(entry: BatchEntry) -> Self {
        Self {
            operation: entry.operation,
            to: entry.to,
            value: entry.value,
            data: entry.data.unwrap_or_default(),
            data_decoded: entry.data_decoded,
        }
    }
}

/// The calls the flattener understands structurally, plus a catch-all
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedCallKind<'a> {
    ExecTransaction(ExecTransactionCall<'a>),
    MultiSend(&'a [BatchEntry]),
    /// Anything else, including wrappers whose shape could not be read
    Opaque,
}

/// The inner call carried by an `execTransaction`
#[derive(Debug, Clone, PartialEq)]
pub struct ExecTransactionCall<'a> {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub data_decoded: Option<&'a DataDecoded>,
}

impl ExecTransactionCall<'_> {
    /// Materializes the unwrapped inner call
    pub fn to_transaction(&self) -> DecodedTransaction {
        DecodedTransaction {
            operation: self.operation,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            data_decoded: self.data_decoded.cloned(),
        }
    }
}

impl DataDecoded {
    pub fn new(method: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            method: method.into(),
            parameters,
        }
    }

    /// Classifies this call.
    ///
    /// Returns `Err(Error::MalformedCall)` only when an `execTransaction`
    /// has fewer than the three positional parameters every decoder emits.
    /// Values that cannot be parsed classify as [`DecodedCallKind::Opaque`].
    pub fn kind(&self) -> Result<DecodedCallKind<'_>> {
        match self.method.as_str() {
            EXEC_TRANSACTION => self.exec_transaction_kind(),
            MULTI_SEND => Ok(
                match self.parameters.first().and_then(|p| p.value_decoded.as_ref()) {
                    Some(ValueDecoded::Batch(entries)) => DecodedCallKind::MultiSend(entries),
                    _ => DecodedCallKind::Opaque,
                },
            ),
            _ => Ok(DecodedCallKind::Opaque),
        }
    }

    fn exec_transaction_kind(&self) -> Result<DecodedCallKind<'_>> {
        let [to, value, data, rest @ ..] = self.parameters.as_slice() else {
            return Err(Error::MalformedCall {
                method: self.method.clone(),
                reason: format!("expected at least 3 parameters, got {}", self.parameters.len()),
            });
        };

        let (Some(to_address), Some(amount), Some(calldata)) =
            (to.as_address(), value.as_u256(), data.as_bytes())
        else {
            return Ok(DecodedCallKind::Opaque);
        };

        let operation = rest
            .first()
            .and_then(|p| Operation::from_json(&p.value))
            .unwrap_or_default();

        let data_decoded = match &data.value_decoded {
            Some(ValueDecoded::Call(inner)) => Some(inner.as_ref()),
            _ => None,
        };

        Ok(DecodedCallKind::ExecTransaction(ExecTransactionCall {
            to: to_address,
            value: amount,
            data: calldata,
            operation,
            data_decoded,
        }))
    }

    /// Positional parameter read as an address
    pub fn address_at(&self, index: usize) -> Option<Address> {
        self.parameters.get(index).and_then(Parameter::as_address)
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            value,
            value_decoded: None,
        }
    }

    pub fn with_value_decoded(mut self, value_decoded: ValueDecoded) -> Self {
        self.value_decoded = Some(value_decoded);
        self
    }

    pub fn as_address(&self) -> Option<Address> {
        self.value.as_str().and_then(|s| Address::from_str(s.trim()).ok())
    }

    pub fn as_u256(&self) -> Option<U256> {
        u256_from_json(&self.value)
    }

    pub fn as_bytes(&self) -> Option<Bytes> {
        self.value.as_str().and_then(|s| Bytes::from_str(s.trim()).ok())
    }
}

fn u256_from_json(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => U256::from_str(s.trim()).ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

/// Accepts decimal strings, `0x` hex strings and JSON integers
fn deserialize_u256<'de, D>(deserializer: D) -> std::result::Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(U256::ZERO);
    }
    u256_from_json(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid uint256 value: {value}")))
}
