use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use color_eyre::eyre::{eyre, Result};
use safe_shield::contracts::IMultiSend;
use safe_shield::encoding::encode_multisend_data;
use safe_shield::{ChainAddresses, DecodedTransaction, Operation};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Safe TX Bundler JSON format
#[derive(Debug, Deserialize)]
pub struct BundleTransaction {
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub operation: u8,
}

/// Loads a bundle file and converts its entries to transactions
pub fn load_bundle(path: &str) -> Result<Vec<DecodedTransaction>> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(eyre!("Bundle file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)?;
    parse_bundle(&content)
}

/// Parses bundle JSON content
pub fn parse_bundle(content: &str) -> Result<Vec<DecodedTransaction>> {
    let transactions: Vec<BundleTransaction> =
        serde_json::from_str(content).map_err(|e| eyre!("Invalid bundle JSON: {}", e))?;

    transactions.into_iter().map(convert_transaction).collect()
}

/// Packs `txs` into the `multiSend` call a Safe would delegatecall
///
/// Returns the MultiSend library address and the calldata.
pub fn wrap_in_multisend(txs: &[DecodedTransaction], call_only: bool) -> (Address, Bytes) {
    let addresses = ChainAddresses::default();
    let target = if call_only {
        addresses.multi_send_call_only
    } else {
        addresses.multi_send
    };

    let data = IMultiSend::multiSendCall {
        transactions: encode_multisend_data(txs),
    }
    .abi_encode();

    (target, Bytes::from(data))
}

fn convert_transaction(tx: BundleTransaction) -> Result<DecodedTransaction> {
    let to = parse_address(&tx.to)?;
    let value = parse_value(&tx.value)?;
    let data = parse_hex_data(&tx.data)?;
    let operation = parse_operation(tx.operation)?;

    Ok(DecodedTransaction::new(to, value, data).with_operation(operation))
}

pub fn parse_address(s: &str) -> Result<Address> {
    s.trim()
        .parse()
        .map_err(|e| eyre!("Invalid address '{}': {}", s, e))
}

pub fn parse_operation(operation: u8) -> Result<Operation> {
    Operation::from_u8(operation).ok_or_else(|| eyre!("Invalid operation: {}", operation))
}

pub fn parse_value(s: &str) -> Result<U256> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| eyre!("Invalid hex value: {}", e)),
        None => s.parse::<U256>().map_err(|e| eyre!("Invalid value: {}", e)),
    }
}

pub fn parse_hex_data(s: &str) -> Result<Bytes> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| eyre!("Invalid hex data: {}", e))?;
    Ok(Bytes::from(bytes))
}
