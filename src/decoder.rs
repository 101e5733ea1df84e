//! Offline calldata decoder
//!
//! Produces the same `DataDecoded` shape as the Safe Transaction Service's
//! decoder for the handful of calls the analysis understands, without any
//! network access.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::contracts::{IMultiSend, ISafe, IERC20};
use crate::encoding::decode_multisend_data;
use crate::error::Result;
use crate::services::Decoder;
use crate::types::{BatchEntry, DataDecoded, Parameter, ValueDecoded};

/// [`Decoder`] for `execTransaction`, `multiSend` and ERC-20 transfers
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDecoder;

impl LocalDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes `data`, returning `None` for empty calldata or an unknown selector
    pub fn decode_call(&self, data: &[u8]) -> Result<Option<DataDecoded>> {
        let Some(selector) = data.get(..4) else {
            return Ok(None);
        };

        let decoded = match selector {
            s if s == ISafe::execTransactionCall::SELECTOR => {
                self.exec_transaction(ISafe::execTransactionCall::abi_decode(data)?)
            }
            s if s == IMultiSend::multiSendCall::SELECTOR => {
                self.multi_send(IMultiSend::multiSendCall::abi_decode(data)?)
            }
            s if s == IERC20::transferCall::SELECTOR => {
                let call = IERC20::transferCall::abi_decode(data)?;
                DataDecoded::new(
                    "transfer",
                    vec![address_param("to", call.to), uint_param("value", call.amount)],
                )
            }
            s if s == IERC20::transferFromCall::SELECTOR => {
                let call = IERC20::transferFromCall::abi_decode(data)?;
                DataDecoded::new(
                    "transferFrom",
                    vec![
                        address_param("from", call.from),
                        address_param("to", call.to),
                        uint_param("value", call.amount),
                    ],
                )
            }
            s if s == IERC20::approveCall::SELECTOR => {
                let call = IERC20::approveCall::abi_decode(data)?;
                DataDecoded::new(
                    "approve",
                    vec![
                        address_param("spender", call.spender),
                        uint_param("value", call.amount),
                    ],
                )
            }
            _ => return Ok(None),
        };

        Ok(Some(decoded))
    }

    /// Nested calldata is decoded best-effort; a malformed inner call stays undecoded
    fn decode_nested(&self, data: &[u8]) -> Option<DataDecoded> {
        match self.decode_call(data) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "leaving nested calldata undecoded");
                None
            }
        }
    }

    fn exec_transaction(&self, call: ISafe::execTransactionCall) -> DataDecoded {
        let mut data = bytes_param("data", &call.data);
        if let Some(inner) = self.decode_nested(&call.data) {
            data = data.with_value_decoded(ValueDecoded::Call(Box::new(inner)));
        }

        DataDecoded::new(
            "execTransaction",
            vec![
                address_param("to", call.to),
                uint_param("value", call.value),
                data,
                Parameter::new("operation", "uint8", json!(call.operation.to_string())),
                uint_param("safeTxGas", call.safeTxGas),
                uint_param("baseGas", call.baseGas),
                uint_param("gasPrice", call.gasPrice),
                address_param("gasToken", call.gasToken),
                address_param("refundReceiver", call.refundReceiver),
                bytes_param("signatures", &call.signatures),
            ],
        )
    }

    fn multi_send(&self, call: IMultiSend::multiSendCall) -> DataDecoded {
        let mut transactions = bytes_param("transactions", &call.transactions);

        // An unreadable batch keeps the raw bytes only, so flattening treats it as a leaf
        match decode_multisend_data(&call.transactions) {
            Ok(txs) => {
                let entries = txs
                    .into_iter()
                    .map(|tx| BatchEntry {
                        operation: tx.operation,
                        to: tx.to,
                        value: tx.value,
                        data_decoded: self.decode_nested(&tx.data),
                        data: (!tx.data.is_empty()).then_some(tx.data),
                    })
                    .collect();
                transactions = transactions.with_value_decoded(ValueDecoded::Batch(entries));
            }
            Err(e) => tracing::warn!(error = %e, "multiSend payload could not be unpacked"),
        }

        DataDecoded::new("multiSend", vec![transactions])
    }
}

#[async_trait]
impl Decoder for LocalDecoder {
    async fn decode(&self, _chain_id: u64, _to: Address, data: &Bytes) -> Result<Option<DataDecoded>> {
        self.decode_call(data)
    }
}

fn address_param(name: &str, value: Address) -> Parameter {
    Parameter::new(name, "address", Value::String(value.to_checksum(None)))
}

fn uint_param(name: &str, value: U256) -> Parameter {
    Parameter::new(name, "uint256", Value::String(value.to_string()))
}

fn bytes_param(name: &str, value: &Bytes) -> Parameter {
    Parameter::new(name, "bytes", Value::String(value.to_string()))
}
