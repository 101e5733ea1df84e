//! EIP-712 support for Safe transactions
//!
//! Threat scans submit Safe transactions as the `eth_signTypedData_v4`
//! payload an owner would sign, so the scanner sees exactly what is approved.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contracts::{DOMAIN_SEPARATOR_TYPEHASH, SAFE_TX_TYPEHASH};
use crate::types::Operation;

/// Safe transaction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxParams {
    /// Target address
    pub to: Address,
    /// Value to send
    #[serde(default)]
    pub value: U256,
    /// Calldata
    #[serde(default)]
    pub data: Bytes,
    /// Operation type
    #[serde(default)]
    pub operation: Operation,
    /// Gas limit for the Safe transaction
    #[serde(default)]
    pub safe_tx_gas: U256,
    /// Base gas (overhead)
    #[serde(default)]
    pub base_gas: U256,
    /// Gas price for refund calculation
    #[serde(default)]
    pub gas_price: U256,
    /// Token used for gas refund (address(0) for ETH)
    #[serde(default)]
    pub gas_token: Address,
    /// Address to receive gas refund
    #[serde(default)]
    pub refund_receiver: Address,
    /// Safe nonce
    #[serde(default)]
    pub nonce: U256,
}

impl SafeTxParams {
    /// Creates new SafeTxParams with minimal parameters
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>, operation: Operation) -> Self {
        Self {
            to,
            value,
            data: data.into(),
            operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce: U256::ZERO,
        }
    }

    /// Sets the nonce
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }
}

fn pad_address(address: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(address.as_slice());
    padded
}

/// Computes the domain separator for a Safe
///
/// domain_separator = keccak256(abi.encode(DOMAIN_SEPARATOR_TYPEHASH, chainId, safeAddress))
pub fn compute_domain_separator(chain_id: u64, safe_address: Address) -> B256 {
    let mut encoded = Vec::with_capacity(96);
    encoded.extend_from_slice(&DOMAIN_SEPARATOR_TYPEHASH);
    encoded.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    encoded.extend_from_slice(&pad_address(safe_address));
    keccak256(&encoded)
}

/// Computes the struct hash for SafeTx
///
/// safeTxHash = keccak256(abi.encode(
///     SAFE_TX_TYPEHASH,
///     to, value, keccak256(data), operation,
///     safeTxGas, baseGas, gasPrice, gasToken, refundReceiver, nonce
/// ))
pub fn compute_safe_tx_hash(params: &SafeTxParams) -> B256 {
    let mut encoded = Vec::with_capacity(352);

    encoded.extend_from_slice(&SAFE_TX_TYPEHASH);
    encoded.extend_from_slice(&pad_address(params.to));
    encoded.extend_from_slice(&params.value.to_be_bytes::<32>());
    encoded.extend_from_slice(keccak256(&params.data).as_slice());

    let mut op_bytes = [0u8; 32];
    op_bytes[31] = params.operation.as_u8();
    encoded.extend_from_slice(&op_bytes);

    encoded.extend_from_slice(&params.safe_tx_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&params.base_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&params.gas_price.to_be_bytes::<32>());
    encoded.extend_from_slice(&pad_address(params.gas_token));
    encoded.extend_from_slice(&pad_address(params.refund_receiver));
    encoded.extend_from_slice(&params.nonce.to_be_bytes::<32>());

    keccak256(&encoded)
}

/// Computes the final EIP-712 hash
///
/// hash = keccak256("\x19\x01" || domainSeparator || safeTxHash)
pub fn compute_transaction_hash(domain_separator: B256, safe_tx_hash: B256) -> B256 {
    let mut encoded = Vec::with_capacity(66);
    encoded.extend_from_slice(&[0x19, 0x01]);
    encoded.extend_from_slice(domain_separator.as_slice());
    encoded.extend_from_slice(safe_tx_hash.as_slice());
    keccak256(&encoded)
}

/// Computes the complete transaction hash owners sign
pub fn compute_safe_transaction_hash(
    chain_id: u64,
    safe_address: Address,
    params: &SafeTxParams,
) -> B256 {
    let domain_separator = compute_domain_separator(chain_id, safe_address);
    let safe_tx_hash = compute_safe_tx_hash(params);
    compute_transaction_hash(domain_separator, safe_tx_hash)
}

/// Builds the `eth_signTypedData_v4` JSON for a Safe transaction
pub fn safe_tx_typed_data(chain_id: u64, safe_address: Address, params: &SafeTxParams) -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "SafeTx": [
                { "name": "to", "type": "address" },
                { "name": "value", "type": "uint256" },
                { "name": "data", "type": "bytes" },
                { "name": "operation", "type": "uint8" },
                { "name": "safeTxGas", "type": "uint256" },
                { "name": "baseGas", "type": "uint256" },
                { "name": "gasPrice", "type": "uint256" },
                { "name": "gasToken", "type": "address" },
                { "name": "refundReceiver", "type": "address" },
                { "name": "nonce", "type": "uint256" }
            ]
        },
        "domain": {
            "chainId": chain_id,
            "verifyingContract": safe_address,
        },
        "primaryType": "SafeTx",
        "message": {
            "to": params.to,
            "value": params.value.to_string(),
            "data": params.data,
            "operation": params.operation.as_u8(),
            "safeTxGas": params.safe_tx_gas.to_string(),
            "baseGas": params.base_gas.to_string(),
            "gasPrice": params.gas_price.to_string(),
            "gasToken": params.gas_token,
            "refundReceiver": params.refund_receiver,
            "nonce": params.nonce.to_string(),
        }
    })
}
